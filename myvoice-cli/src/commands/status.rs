//! `myvoice status`: configuration, lifecycle state and profiles.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use myvoice_core::LifecycleState;
use myvoice_sync::StoreStatus;

use super::StoreArgs;

/// Arguments for `myvoice status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, store: &StoreArgs) -> Result<()> {
        let status = store.open()?.status();
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&status).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&status);
        Ok(())
    }
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "field")]
    field: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

fn print_table(status: &StoreStatus) {
    println!(
        "myvoice v{} | {} {}",
        env!("CARGO_PKG_VERSION"),
        state_indicator(status.state),
        state_label(status.state),
    );

    let mut rows = vec![
        StatusRow {
            field: "source",
            value: status.source.clone(),
        },
        StatusRow {
            field: "mirror",
            value: status.mirror_path.display().to_string(),
        },
        StatusRow {
            field: "versioned",
            value: yes_no(status.is_versioned),
        },
    ];
    if let Some(sync) = status.sync.as_ref() {
        rows.push(StatusRow {
            field: "stale",
            value: yes_no(sync.is_stale),
        });
        rows.push(StatusRow {
            field: "uncommitted changes",
            value: sync.has_changes.map(yes_no).unwrap_or_else(unknown),
        });
        rows.push(StatusRow {
            field: "commit",
            value: sync.current_commit.clone().unwrap_or_else(unknown),
        });
    }
    rows.push(StatusRow {
        field: "profiles",
        value: if status.profiles.is_empty() {
            "none".to_string()
        } else {
            status
                .profiles
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        },
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    match status.state {
        LifecycleState::Unconfigured => println!(
            "Set config.my-voice.profile_source in ~/.amplifier/settings.yaml, or pass --source."
        ),
        LifecycleState::ConfiguredNeedsClone => {
            println!("Run 'myvoice sync' to clone the profile repository.")
        }
        LifecycleState::ConfiguredNoProfile => {
            println!("Run 'myvoice write --content ...' to create your first profile.")
        }
        LifecycleState::Ready => {}
    }
}

fn state_label(state: LifecycleState) -> &'static str {
    match state {
        LifecycleState::Unconfigured => "UNCONFIGURED",
        LifecycleState::ConfiguredNeedsClone => "NEEDS CLONE",
        LifecycleState::ConfiguredNoProfile => "NO PROFILE",
        LifecycleState::Ready => "READY",
    }
}

fn state_indicator(state: LifecycleState) -> String {
    match state {
        LifecycleState::Unconfigured => "■".bright_black().bold().to_string(),
        LifecycleState::ConfiguredNeedsClone => "■".yellow().bold().to_string(),
        LifecycleState::ConfiguredNoProfile => "■".cyan().bold().to_string(),
        LifecycleState::Ready => "■".green().bold().to_string(),
    }
}

fn yes_no(flag: bool) -> String {
    let word = if flag { "yes" } else { "no" };
    word.to_string()
}

fn unknown() -> String {
    "unknown".to_string()
}
