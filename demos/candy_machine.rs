//! Candy Machine
//!
//! This demo drives a coin-operated candy machine through a capsule.
//!
//! Key concepts:
//! - Pure transitions with guards for no-op branches
//! - Side effects that run after the new state is published
//! - Observing state through a subscription
//! - Errors for unregistered actions
//!
//! Run with: cargo run --example candy_machine

use capsule::builder::guarded;
use capsule::core::{Effect, SideEffect};
use capsule::{CapsuleBuilder, CapsuleError, FanOutPolicy};
use futures::StreamExt;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, PartialEq)]
struct CandyMachine {
    locked: bool,
    candies: u32,
    coins: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Action {
    InsertCoin,
    TurnKnob,
    RefillCandies,
}

fn announce(message: &'static str) -> SideEffect<CandyMachine, Action> {
    SideEffect::new(move |previous: CandyMachine, action: Action| async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        info!(?action, candies_before = previous.candies, "{message}");
        Ok(())
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Candy Machine Example ===\n");

    let machine = CapsuleBuilder::new()
        .initial(CandyMachine {
            locked: true,
            candies: 2,
            coins: 0,
        })
        .add_transition(
            Action::InsertCoin,
            guarded(
                |m: &CandyMachine| m.locked && m.candies > 0,
                |m: &CandyMachine, _: &Action| {
                    Effect::pure(CandyMachine {
                        locked: false,
                        coins: m.coins + 1,
                        ..m.clone()
                    })
                    .also(announce("CandyMachine unlocked."))
                    .and(announce("You can now turn the knob to get 1 candy."))
                },
            ),
        )
        .add_transition(
            Action::TurnKnob,
            guarded(
                |m: &CandyMachine| !m.locked && m.candies > 0,
                |m: &CandyMachine, _: &Action| {
                    Effect::pure(CandyMachine {
                        locked: true,
                        candies: m.candies - 1,
                        ..m.clone()
                    })
                    .also(announce("You can now collect your candy."))
                    .and(announce("CandyMachine locked. Insert another coin."))
                },
            ),
        )
        .fan_out(FanOutPolicy::FailFast)
        .build()?;

    let mut states = machine.subscribe();
    let observer = tokio::spawn(async move {
        while let Some(state) = states.next().await {
            println!("  [State] {state:?}");
        }
    });

    for action in [
        Action::InsertCoin,
        Action::InsertCoin,
        Action::TurnKnob,
        Action::TurnKnob,
        Action::InsertCoin,
        Action::TurnKnob,
        Action::InsertCoin,
    ] {
        println!("\n> {action:?}");
        machine.run(action).await?;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    println!("\n> RefillCandies");
    match machine.run(Action::RefillCandies).await {
        Err(error @ CapsuleError::NoTransitionFound { .. }) => println!("  [Error] {error}"),
        other => println!("  [Unexpected] {other:?}"),
    }

    println!("\nFinal state: {:?}", machine.current());

    drop(machine);
    observer.await?;

    println!("\n=== Example Complete ===");
    Ok(())
}
