use bac_core::*;
use chrono::{Duration, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bacwatch")]
#[command(about = "Real-time blood alcohol concentration tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Whose drinks to read and write
    #[arg(long, global = true)]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current BAC and today's intake (default)
    Status {
        /// Day whose intake to total (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Log a drink
    Add {
        /// beer, wine, spirits, or any other label
        #[arg(long, default_value = "beer")]
        kind: String,

        /// Volume in cc (defaults to the preset serving)
        #[arg(long)]
        volume: Option<f64>,

        /// Alcohol by volume in percent (defaults to the preset strength)
        #[arg(long)]
        abv: Option<f64>,

        /// Backdate the drink
        #[arg(long, default_value_t = 0)]
        minutes_ago: i64,
    },

    /// List drinks for a day
    List {
        /// YYYY-MM-DD, default today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete a drink by id
    Rm {
        id: DrinkId,
    },

    /// Show or update the profile used for BAC estimation
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Keep printing the decaying BAC
    Watch {
        /// Seconds between refreshes (defaults to the configured period)
        #[arg(long)]
        period_secs: Option<u64>,

        /// Stop after this many refreshes
        #[arg(long)]
        count: Option<usize>,
    },

    /// Export a day's drinks to CSV
    Export {
        #[arg(long)]
        out: PathBuf,

        /// YYYY-MM-DD, default today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Export every logged drink
        #[arg(long, conflicts_with = "date")]
        all: bool,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Set {
        #[arg(long)]
        gender: Gender,

        /// Body weight in kg (20-300)
        #[arg(long)]
        weight: f64,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    bac_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let user = UserId::new(cli.user.unwrap_or_else(|| config.user.default.clone()))?;
    let mut store = FileStore::new(data_dir);

    match cli.command {
        Some(Commands::Status { date }) => cmd_status(&store, &user, date, &config),
        Some(Commands::Add {
            kind,
            volume,
            abv,
            minutes_ago,
        }) => cmd_add(&mut store, &user, &kind, volume, abv, minutes_ago),
        Some(Commands::List { date }) => cmd_list(&store, &user, date),
        Some(Commands::Rm { id }) => cmd_rm(&mut store, &user, id),
        Some(Commands::Profile { action }) => match action {
            Some(ProfileAction::Set { gender, weight }) => {
                cmd_profile_set(&mut store, &user, gender, weight)
            }
            Some(ProfileAction::Show) | None => cmd_profile_show(&store, &user),
        },
        Some(Commands::Watch { period_secs, count }) => {
            cmd_watch(store, user, period_secs, count, &config)
        }
        Some(Commands::Export { out, date, all }) => cmd_export(&store, &user, &out, date, all),
        None => {
            // Default to "status" command
            cmd_status(&store, &user, None, &config)
        }
    }
}

fn day_window(date: Option<NaiveDate>) -> Result<(NaiveDate, TimeWindow)> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    Ok((date, TimeWindow::day_of(date, &Local)?))
}

fn cmd_status(
    store: &FileStore,
    user: &UserId,
    date: Option<NaiveDate>,
    config: &Config,
) -> Result<()> {
    let (date, window) = day_window(date)?;
    let reading = take_reading(store, user, Utc::now(), &window, &config.reading_options())?;

    display_reading(&reading);
    println!();
    display_intake(&reading.intake, date);
    Ok(())
}

fn cmd_add(
    store: &mut FileStore,
    user: &UserId,
    kind: &str,
    volume: Option<f64>,
    abv: Option<f64>,
    minutes_ago: i64,
) -> Result<()> {
    if minutes_ago < 0 {
        return Err(Error::invalid("--minutes-ago cannot be negative"));
    }

    let kind = DrinkKind::from_label(kind);
    let timestamp = Duration::try_minutes(minutes_ago)
        .and_then(|ago| Utc::now().checked_sub_signed(ago))
        .ok_or_else(|| {
            Error::invalid(format!("--minutes-ago {} is out of range", minutes_ago))
        })?;
    let draft = match preset_for(&kind) {
        Some(preset) => preset.draft(timestamp, volume, abv)?,
        None => {
            let (Some(volume_cc), Some(abv_percent)) = (volume, abv) else {
                return Err(Error::invalid(format!(
                    "no preset for {:?}; pass --volume and --abv",
                    kind.label()
                )));
            };
            NewDrink {
                kind,
                timestamp,
                volume_cc,
                abv_percent,
            }
        }
    };

    let pure = pure_alcohol(draft.volume_cc, draft.abv_percent)?;
    let summary = format!(
        "{} {} cc @ {}% ({:.1} cc pure alcohol)",
        draft.kind, draft.volume_cc, draft.abv_percent, pure.cc
    );
    let id = store.create_event(user, draft)?;

    println!("✓ Logged {}", summary);
    println!("  id: {}", id);
    Ok(())
}

fn cmd_list(store: &FileStore, user: &UserId, date: Option<NaiveDate>) -> Result<()> {
    let (date, window) = day_window(date)?;
    let drinks = store.list_events(user, &window)?;

    if drinks.is_empty() {
        println!("No drinks logged on {}.", date);
        return Ok(());
    }

    println!("Drinks on {}:", date);
    for drink in &drinks {
        display_drink(drink)?;
    }
    Ok(())
}

fn cmd_rm(store: &mut FileStore, user: &UserId, id: DrinkId) -> Result<()> {
    store.delete_event(user, id)?;
    println!("✓ Deleted drink {}", id);
    Ok(())
}

fn cmd_profile_show(store: &FileStore, user: &UserId) -> Result<()> {
    match store.get_profile(user)? {
        Some(profile) => println!("Profile: {}, {} kg", profile.gender, profile.weight_kg),
        None => {
            println!("No profile set.");
            println!("  {}", status::PROFILE_PROMPT);
            println!("  bacwatch profile set --gender male --weight 70");
        }
    }
    Ok(())
}

fn cmd_profile_set(
    store: &mut FileStore,
    user: &UserId,
    gender: Gender,
    weight: f64,
) -> Result<()> {
    let profile = Profile::new(gender, weight)?;
    store.upsert_profile(user, profile)?;
    println!("✓ Profile saved: {}, {} kg", profile.gender, profile.weight_kg);
    Ok(())
}

fn cmd_watch(
    store: FileStore,
    user: UserId,
    period_secs: Option<u64>,
    count: Option<usize>,
    config: &Config,
) -> Result<()> {
    let period = match period_secs {
        Some(0) => return Err(Error::invalid("--period-secs must be at least 1")),
        Some(secs) => std::time::Duration::from_secs(secs),
        None => config.refresh_period(),
    };
    let options = config.reading_options();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
        let mut refreshes = 0usize;

        let mut scheduler = RefreshScheduler::new(period);
        scheduler.start(move |trigger| {
            refreshes += 1;
            let shown = day_window(None).and_then(|(_, window)| {
                take_reading(&store, &user, Utc::now(), &window, &options)
            });
            match shown {
                Ok(reading) => display_watch_line(&reading, trigger),
                Err(e) => {
                    tracing::error!("Refresh failed: {}", e);
                    eprintln!("Refresh failed: {}", e);
                }
            }
            if count.is_some_and(|limit| refreshes >= limit) {
                let _ = done_tx.send(());
            }
        })?;

        tokio::select! {
            _ = done_rx.recv() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watch");
            }
        }

        scheduler.stop();
        Ok::<(), Error>(())
    })
}

fn cmd_export(
    store: &FileStore,
    user: &UserId,
    out: &std::path::Path,
    date: Option<NaiveDate>,
    all: bool,
) -> Result<()> {
    let window = if all {
        TimeWindow::all()
    } else {
        day_window(date)?.1
    };
    let drinks = store.list_events(user, &window)?;
    let count = bac_core::export::write_csv(&drinks, out)?;

    println!("✓ Exported {} drinks", count);
    println!("  CSV: {}", out.display());
    Ok(())
}

fn display_reading(reading: &Reading) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  BAC {:.3}%", reading.bac.value);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  {} (tier {})",
        reading.status.label,
        reading.status.tier.level()
    );
    println!("  {}", reading.status.description);
}

fn display_intake(intake: &IntakeSummary, date: NaiveDate) {
    println!(
        "  Pure alcohol on {}: {:.1} cc ({:.0}% of {:.0} cc limit)",
        date,
        intake.total_pure_cc,
        intake.fraction * 100.0,
        intake.limit_cc
    );
    if intake.over_limit {
        println!("  ⚠ Over the recommended intake");
    }
}

fn display_drink(drink: &DrinkEvent) -> Result<()> {
    let pure = drink.pure_alcohol()?;
    println!(
        "  {}  {}  {:<8} {:>6} cc @ {:>4}%  ({:.1} cc pure)",
        drink.id,
        drink.timestamp.with_timezone(&Local).format("%H:%M"),
        drink.kind.label(),
        drink.volume_cc,
        drink.abv_percent,
        pure.cc
    );
    Ok(())
}

fn display_watch_line(reading: &Reading, trigger: RefreshTrigger) {
    let over = if reading.intake.over_limit {
        "  ⚠ over limit"
    } else {
        ""
    };
    println!(
        "[{}] BAC {:.3}%  {}  | today {:.1} cc{}  ({:?})",
        reading.bac.at.with_timezone(&Local).format("%H:%M:%S"),
        reading.bac.value,
        reading.status.label,
        reading.intake.total_pure_cc,
        over,
        trigger
    );
}
