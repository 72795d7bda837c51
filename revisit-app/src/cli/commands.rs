use crate::cli::opts::*;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use revisit_core::{
    daily_streak, format_delta, order_for_session, preview_all, shuffle_for_practice, summarize,
    Card, CardStore, CoreError, FoldingCollator, MemoryStore, PhaseSchedule, Quality, Session,
    SessionConfig,
};
use revisit_json::JsonStore;
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

pub async fn run_cli(args: Cli) -> Result<()> {
    let store = open_store(&args.store, args.data_file.clone()).await?;
    let schedule = args.schedule.build();
    match args.cmd {
        Command::Card(cmd) => card_cmd(store, cmd).await,
        Command::Study(cmd) => study_cmd(store, schedule, cmd).await,
        Command::Practice(cmd) => practice_cmd(store, schedule, cmd).await,
        Command::Preview { card_id } => preview_cmd(store, schedule, &card_id).await,
        Command::Stats => stats_cmd(store).await,
    }
}

pub async fn open_store(kind: &StoreKind, data_file: Option<PathBuf>) -> Result<Arc<dyn CardStore>> {
    match kind {
        StoreKind::Json => {
            let s = match data_file {
                Some(p) => JsonStore::open_file(p).await?,
                None => JsonStore::open_default().await?,
            };
            log::debug!("using JSON store at {}", s.path().display());
            Ok(Arc::new(s))
        }
        StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

async fn card_cmd(store: Arc<dyn CardStore>, cmd: CardCmd) -> Result<()> {
    match cmd {
        CardCmd::Add { front, back } => {
            let c = store.add_card(&front, &back).await?;
            println!("{}", c.id);
        }
        CardCmd::List { due } => {
            let mut cards = if due {
                store.load_due(Utc::now()).await?
            } else {
                store.load_all().await?
            };
            cards.sort_by_key(|c| c.created_at);
            for c in cards {
                println!(
                    "{}\t{}\t{}\treps={}\tinterval={}\tease={:.2}\tdue={}",
                    c.id,
                    c.front,
                    c.back,
                    c.repetitions,
                    c.interval,
                    c.ease_factor,
                    c.due_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        CardCmd::Rm { card_id } => {
            let id = parse_uuid(&card_id)?;
            store.delete_card(id).await?;
            println!("ok");
        }
    }
    Ok(())
}

async fn study_cmd(store: Arc<dyn CardStore>, schedule: PhaseSchedule, cmd: SessionArgs) -> Result<()> {
    let now = Utc::now();
    let pool = if cmd.all {
        store.load_all().await?
    } else {
        store.load_due(now).await?
    };
    let mut cards = order_for_session(pool, &schedule, &FoldingCollator::new());
    cards.truncate(cmd.max);

    let config = SessionConfig::study().with_persist(!cmd.no_persist);
    run_session(store, Session::new(schedule, config), cards).await
}

async fn practice_cmd(store: Arc<dyn CardStore>, schedule: PhaseSchedule, cmd: PracticeArgs) -> Result<()> {
    let pool = if cmd.due {
        store.load_due(Utc::now()).await?
    } else {
        store.load_all().await?
    };
    let mut cards = if cmd.shuffle {
        shuffle_for_practice(pool, &mut rand::thread_rng())
    } else {
        order_for_session(pool, &schedule, &FoldingCollator::new())
    };
    cards.truncate(cmd.max);

    let config = SessionConfig::practice().with_persist(cmd.persist);
    run_session(store, Session::new(schedule, config), cards).await
}

async fn run_session(store: Arc<dyn CardStore>, mut session: Session, cards: Vec<Card>) -> Result<()> {
    match session.start(cards) {
        Err(CoreError::EmptyQueue) => {
            println!("nothing to review");
            return Ok(());
        }
        other => other?,
    }

    while let Some(card) = session.current().cloned() {
        let p = session.progress();
        println!("\n[{} done, {} left] {}", p.reviewed, p.remaining, card.id);
        println!("Q: {}", card.front);
        prompt_enter("[enter=show]")?;
        println!("A: {}", card.back);

        let shown_at = Utc::now();
        let hints = preview_all(&card, shown_at, session.schedule());
        println!(
            "[0=Fail ({}), 3=Good ({}), 5=Easy ({}), u=undo, q=quit]",
            hints[0].1, hints[1].1, hints[2].1
        );

        loop {
            let line = read_line("grade> ")?;
            match line.trim().to_lowercase().as_str() {
                "q" | "quit" => {
                    println!("\nreviewed {}", session.reviewed_count());
                    session.abandon();
                    return Ok(());
                }
                "u" | "undo" => {
                    println!("{}", undo_reply(session.undo(&*store).await)?);
                    break;
                }
                other => {
                    let Ok(quality) = other.parse::<Quality>() else {
                        println!("enter 0/f, 3/g, 5/e, u, or q");
                        continue;
                    };
                    let now = Utc::now();
                    match session.submit_review(&*store, quality, now).await {
                        Ok(out) if out.requeued => {
                            println!("→ again this session");
                            break;
                        }
                        Ok(out) => {
                            println!("→ next due in {}", format_delta(out.updated.due_at - now));
                            break;
                        }
                        Err(e @ CoreError::Persistence { .. }) => {
                            log::error!("{e}");
                            println!("could not save, answer again or q to quit");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }
    }

    println!("\nsession complete, reviewed {}", session.reviewed_count());
    Ok(())
}

async fn preview_cmd(store: Arc<dyn CardStore>, schedule: PhaseSchedule, card_id: &str) -> Result<()> {
    let card = store.get_card(parse_uuid(card_id)?).await?;
    for (quality, label) in preview_all(&card, Utc::now(), &schedule) {
        println!("{quality:?}\t{label}");
    }
    Ok(())
}

async fn stats_cmd(store: Arc<dyn CardStore>) -> Result<()> {
    let reviews = store.list_reviews().await?;
    let summary = summarize(&reviews);
    let t = &summary.totals;
    println!(
        "reviews={}\tfail={}\tgood={}\teasy={}\taccuracy={:.0}%",
        t.total,
        t.fail,
        t.good,
        t.easy,
        t.accuracy() * 100.0
    );
    println!("streak={} day(s)", daily_streak(&reviews, Utc::now().date_naive()));
    for (day, totals) in summary.per_day.iter().rev().take(7) {
        println!("{day}\t{}", totals.total);
    }
    Ok(())
}

// ===== Helpers =====
/// A store failure during undo leaves the session untouched, so the user can retry.
fn undo_reply(res: Result<bool, CoreError>) -> Result<&'static str> {
    match res {
        Ok(true) => Ok("undone"),
        Ok(false) => Ok("nothing to undo"),
        Err(e @ CoreError::Persistence { .. }) => {
            log::error!("{e}");
            Ok("could not undo, try again or q to quit")
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s.trim()).map_err(|_| anyhow!("invalid card id: {s}"))
}

fn prompt_enter(label: &str) -> Result<()> {
    read_line(label).map(|_| ())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    stdout().flush().ok();
    let mut s = String::new();
    if stdin().read_line(&mut s)? == 0 {
        bail!("end of input");
    }
    Ok(s)
}
