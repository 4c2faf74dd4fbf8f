use std::{error::Error, path::PathBuf};

use dmx_channels::{Channel, ChannelError, Fixture, ParsedFixture};

fn main() -> Result<(), Box<dyn Error>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dmx_channels=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("usage: dmx-channels <fixture.json>");
        std::process::exit(2);
    };

    let parsed = ParsedFixture::from_path(&path)?;
    print_fixture(parsed.fixture());
    for problem in parsed.problems() {
        println!("problem: {problem}");
    }
    Ok(())
}

fn print_fixture(fixture: &Fixture) {
    println!("{}", fixture.name());
    for channel in fixture.all_channels() {
        match describe(&channel) {
            Ok(description) => println!("  {:<24} {description}", channel.key()),
            Err(e) => println!("  {:<24} error: {e}", channel.key()),
        }
    }
    for mode in fixture.modes() {
        let keys: Vec<&str> = mode
            .mode()
            .channel_keys()
            .iter()
            .map(|key| key.as_deref().unwrap_or("-"))
            .collect();
        println!("mode {}: {}", mode.name(), keys.join(", "));
    }
}

fn describe(channel: &Channel) -> Result<String, ChannelError> {
    Ok(match channel {
        Channel::Coarse(c) => format!(
            "{} ({}, default {}, highlight {}, {}{}{})",
            c.channel_type()?,
            c.max_resolution(),
            c.default_value()?,
            c.highlight_value()?,
            c.precedence(),
            if c.can_crossfade()? { ", crossfade" } else { "" },
            if c.is_inverted()? { ", inverted" } else { "" },
        ),
        Channel::Fine(f) => format!("{} of {}", f.name(), f.coarse_channel().key()),
        Channel::Switching(s) => format!(
            "switched by {} between {}",
            s.trigger_channel().key(),
            s.switch_to_channel_keys().join(", ")
        ),
    })
}
