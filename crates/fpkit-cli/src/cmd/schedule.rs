use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use fpkit_core::clock::{Clock, ManualClock, SystemClock};
use fpkit_core::config::Config;
use fpkit_core::scheduler::{
    delay_from_millis, DelayQueue, DrainReport, FailurePolicy, ScheduledAction, WaitNotice,
};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ScheduleSubcommand {
    /// Spawn an enemy, play a sound and bump a score, each after a delay
    Demo {
        /// Skip the real waits (virtual clock)
        #[arg(long)]
        instant: bool,
    },

    /// Queue one message per DELAY_MS=MESSAGE argument and run them in order
    Run {
        /// Tasks as DELAY_MS=MESSAGE; the message `fail` makes that task fail
        #[arg(
            required = true,
            allow_hyphen_values = true,
            value_name = "DELAY_MS=MESSAGE"
        )]
        tasks: Vec<String>,

        /// Skip the real waits (virtual clock)
        #[arg(long)]
        instant: bool,

        /// Keep draining after a failed task (overrides runner.failure_policy)
        #[arg(long)]
        continue_on_failure: bool,

        /// Retry a failed task up to N times (overrides runner.retry.max_retries)
        #[arg(long, value_name = "N")]
        retries: Option<u32>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config: Option<&Path>, subcmd: ScheduleSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ScheduleSubcommand::Demo { instant } => demo(instant, json),
        ScheduleSubcommand::Run {
            tasks,
            instant,
            continue_on_failure,
            retries,
        } => {
            let cfg = super::load_config(config)?;
            run_tasks(&cfg, &tasks, instant, continue_on_failure, retries, json)
        }
    }
}

/// Prints each line as it happens in text mode and keeps a copy for JSON mode.
struct Transcript {
    json: bool,
    lines: RefCell<Vec<String>>,
}

impl Transcript {
    fn new(json: bool) -> Self {
        Self {
            json,
            lines: RefCell::new(Vec::new()),
        }
    }

    fn say(&self, line: String) {
        if !self.json {
            println!("{line}");
        }
        self.lines.borrow_mut().push(line);
    }

    fn announce(&self, notice: &WaitNotice<'_>) {
        let ms = notice.delay.as_millis();
        if notice.attempt == 0 {
            self.say(format!("Waiting {ms}ms before executing..."));
        } else {
            self.say(format!("Attempt {}: retrying in {ms}ms...", notice.attempt));
        }
    }

    fn into_lines(self) -> Vec<String> {
        self.lines.into_inner()
    }
}

fn pick_clock<'c>(
    instant: bool,
    system: &'c SystemClock,
    manual: &'c ManualClock,
) -> &'c dyn Clock {
    if instant {
        manual
    } else {
        system
    }
}

// ---------------------------------------------------------------------------
// demo
// ---------------------------------------------------------------------------

struct Entity {
    id: String,
    x: f32,
    y: f32,
}

fn demo(instant: bool, json: bool) -> anyhow::Result<()> {
    let system = SystemClock;
    let manual = ManualClock::new();
    let transcript = Transcript::new(json);
    let score = Cell::new(0u32);

    let report = {
        let out = &transcript;
        let score = &score;
        let mut queue = DelayQueue::with_clock(pick_clock(instant, &system, &manual))
            .on_wait(move |notice| out.announce(notice));

        let enemy = Entity {
            id: "Enemy-001".to_string(),
            x: 10.0,
            y: 20.0,
        };
        queue.push(
            ScheduledAction::new(Duration::from_millis(1000), move || {
                out.say(format!(
                    "Spawning {} at ({}, {})",
                    enemy.id, enemy.x, enemy.y
                ));
            })
            .with_label("spawn"),
        );

        let sound_file = String::from("explosion.wav");
        queue.push(
            ScheduledAction::new(Duration::from_millis(500), move || {
                out.say(format!("Playing sound: {sound_file}"));
            })
            .with_label("sound"),
        );

        queue.push(
            ScheduledAction::new(Duration::from_millis(750), move || {
                score.set(score.get() + 100);
                out.say(format!("Score updated: +100 -> Total: {}", score.get()));
            })
            .with_label("score"),
        );

        out.say("Starting task scheduler...".to_string());
        queue.run().context("demo drain failed")?
    };

    if json {
        let value = serde_json::json!({
            "output": transcript.into_lines(),
            "score": score.get(),
            "report": report,
        });
        print_json(&value)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Split `DELAY_MS=MESSAGE` into a validated delay and the message.
fn parse_task(arg: &str) -> anyhow::Result<(Duration, String)> {
    let (delay, message) = arg
        .split_once('=')
        .with_context(|| format!("task '{arg}' must look like DELAY_MS=MESSAGE"))?;
    let delay_ms: i64 = delay
        .trim()
        .parse()
        .with_context(|| format!("task '{arg}': delay '{delay}' is not an integer"))?;
    let delay = delay_from_millis(delay_ms).with_context(|| format!("task '{arg}'"))?;
    Ok((delay, message.to_string()))
}

fn run_tasks(
    cfg: &Config,
    tasks: &[String],
    instant: bool,
    continue_on_failure: bool,
    retries: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let parsed = tasks
        .iter()
        .map(|arg| parse_task(arg))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let policy = if continue_on_failure {
        FailurePolicy::Continue
    } else {
        cfg.runner.failure_policy
    };
    let mut retry = cfg.runner.retry.policy();
    if let Some(n) = retries {
        retry.max_retries = n;
    }

    let system = SystemClock;
    let manual = ManualClock::new();
    let transcript = Transcript::new(json);

    let result: anyhow::Result<DrainReport> = {
        let out = &transcript;
        let mut queue = DelayQueue::with_clock(pick_clock(instant, &system, &manual))
            .failure_policy(policy)
            .retry_policy(retry)
            .on_wait(move |notice| out.announce(notice));

        for (i, (delay, message)) in parsed.into_iter().enumerate() {
            let label = format!("task-{i}");
            let action = ScheduledAction::fallible(delay, move || {
                if message == "fail" {
                    anyhow::bail!("task asked to fail");
                }
                out.say(message.clone());
                Ok(())
            });
            queue.push(action.with_label(label));
        }

        queue.run().context("schedule drain failed")
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            if json {
                print_json(&serde_json::json!({ "output": transcript.into_lines() }))?;
            }
            return Err(e);
        }
    };

    if json {
        let value = serde_json::json!({
            "output": transcript.into_lines(),
            "report": report,
        });
        print_json(&value)?;
    } else {
        println!(
            "Done: {} executed, {} failed, waited {}ms",
            report.executed,
            report.failures.len(),
            report.waited.as_millis()
        );
        for f in &report.failures {
            println!(
                "  failed #{} {} after {} attempt(s): {}",
                f.position,
                f.label.as_deref().unwrap_or("-"),
                f.attempts,
                f.reason
            );
        }
    }

    if !report.is_clean() {
        anyhow::bail!(
            "{} of {} tasks failed",
            report.failures.len(),
            report.drained()
        );
    }
    Ok(())
}
