use std::{collections::HashSet, fs::File, io::Read, path::Path};

use getset::Getters;

use crate::{
    low_level::{ChannelRecord, FixtureRecord},
    CoarseChannel, Fixture, FixtureInfo, FixtureParseError, HandleProblem, Mode, Problem,
    Problems, ProblemsMut, Resolution, Wheel,
};

/// A loaded fixture with all problems found while loading it.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct ParsedFixture {
    fixture: Fixture,
    problems: Problems,
}

impl ParsedFixture {
    pub fn from_json(json: &str) -> Result<Self, FixtureParseError> {
        let record: FixtureRecord = serde_json::from_str(json)?;
        Ok(record.into())
    }

    pub fn from_reader<T: Read>(reader: T) -> Result<Self, FixtureParseError> {
        let record: FixtureRecord = serde_json::from_reader(reader)?;
        Ok(record.into())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FixtureParseError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FixtureParseError::OpenError(path.into(), e))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn into_parts(self) -> (Fixture, Problems) {
        (self.fixture, self.problems)
    }
}

impl Fixture {
    pub fn from_json(json: &str) -> Result<ParsedFixture, FixtureParseError> {
        ParsedFixture::from_json(json)
    }

    pub fn from_reader<T: Read>(reader: T) -> Result<ParsedFixture, FixtureParseError> {
        ParsedFixture::from_reader(reader)
    }
}

impl From<FixtureRecord> for ParsedFixture {
    fn from(record: FixtureRecord) -> Self {
        let wheels = record
            .wheels
            .iter()
            .map(|(name, wheel)| Wheel::from_record(name, wheel))
            .collect();
        let info = FixtureInfo::new(record.name, wheels);
        let modes = record.modes.into_iter().map(Mode::from).collect();

        let mut problems = Problems::new();
        validate_coarse_keys(&record.available_channels, &mut problems);
        let fixture = Fixture::new(info, record.available_channels, modes);

        validate_channel_keys(&fixture, &mut problems);
        for channel in fixture.coarse_channels() {
            validate_channel(channel, &mut problems);
        }
        validate_modes(&fixture, &mut problems);

        tracing::debug!(
            fixture = fixture.name(),
            channels = fixture.all_channels().len(),
            problems = problems.len(),
            "loaded fixture"
        );
        ParsedFixture { fixture, problems }
    }
}

fn validate_coarse_keys(channels: &[(String, ChannelRecord)], p: &mut impl ProblemsMut) {
    let mut seen = HashSet::new();
    for (i, (key, _)) in channels.iter().enumerate() {
        if !seen.insert(key.as_str()) {
            Problem::DuplicateChannelKey(key.clone())
                .at(format!("availableChannels/{i}"))
                .handled_by("ignoring the later channel", p);
        }
    }
}

fn validate_channel_keys(fixture: &Fixture, p: &mut impl ProblemsMut) {
    let mut seen = HashSet::new();
    for channel in fixture.all_channels() {
        let key = channel.key();
        if !seen.insert(key) {
            Problem::DuplicateChannelKey(key.to_owned())
                .at(format!("availableChannels/{}", channel.coarse_channel().key()))
                .handled_by("only the first channel with this key is used", p);
        }
    }
}

fn validate_channel(channel: &CoarseChannel, p: &mut impl ProblemsMut) {
    let at = format!("availableChannels/{}", channel.key());

    let fine_channels = channel.fine_channel_aliases().len();
    if fine_channels >= usize::from(Resolution::BIT32.bytes()) {
        Problem::TooManyFineChannels {
            fine_channels,
            max: Resolution::BIT32,
        }
        .at(format!("{at}/fineChannelAliases"))
        .handled_by("ignoring the aliases beyond 32 bit", p);
    }

    validate_switching_aliases(channel, &at, p);

    for result in [channel.default_value(), channel.highlight_value()] {
        result
            .map_err(|e| Problem::InvalidChannel(e).at(at.as_str()))
            .ok_or_handled_by("reporting the error again when the value is accessed", p);
    }

    let Some(capabilities) = channel
        .capabilities()
        .map_err(|e| Problem::InvalidChannel(e).at(format!("{at}/capabilities")))
        .ok_or_handled_by("reporting the error again when capabilities are accessed", p)
    else {
        return;
    };

    channel
        .check_capability_ranges()
        .map_err(|e| Problem::CapabilityRanges(e).at(format!("{at}/capabilities")))
        .ok_or_handled_by("keeping capabilities as they are", p);

    for (i, capability) in capabilities.iter().enumerate() {
        for wheel in capability.wheel_names() {
            if channel.fixture().wheel(wheel).is_none() {
                Problem::UnknownWheel(wheel.clone())
                    .at(format!("{at}/capabilities/{i}"))
                    .handled_by("ignoring wheel", p);
            }
        }
    }
}

fn validate_switching_aliases(channel: &CoarseChannel, at: &str, p: &mut impl ProblemsMut) {
    let expected = channel.switching_channel_aliases();
    for (i, capability) in channel.capability_records().iter().enumerate().skip(1) {
        let found: Vec<String> = capability.switch_channels.keys().cloned().collect();
        let same_aliases = found.len() == expected.len()
            && found.iter().all(|alias| expected.contains(alias));
        if !same_aliases {
            Problem::SwitchingAliasMismatch {
                expected: expected.to_vec(),
                found,
            }
            .at(format!("{at}/capabilities/{i}"))
            .handled_by("using the aliases of the first capability", p);
        }
    }
}

fn validate_modes(fixture: &Fixture, p: &mut impl ProblemsMut) {
    for (i, mode) in fixture.modes().enumerate() {
        for (j, key) in mode.mode().channel_keys().iter().enumerate() {
            let Some(key) = key else {
                continue;
            };
            if fixture.channel(key).is_none() {
                Problem::UnknownChannel(key.clone())
                    .at(format!("modes/{i}/channels/{j}"))
                    .handled_by("keeping the reference", p);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::ChannelError;

    use super::*;

    fn parse(value: serde_json::Value) -> ParsedFixture {
        ParsedFixture::from_json(&value.to_string()).unwrap()
    }

    #[test]
    fn clean_fixture_has_no_problems() {
        let parsed = parse(json!({
            "name": "Dimmer",
            "availableChannels": {
                "Dimmer": { "fineChannelAliases": ["Dimmer fine"], "capability": { "type": "Intensity" } }
            },
            "modes": [{ "name": "16bit", "channels": ["Dimmer", "Dimmer fine"] }]
        }));
        assert_eq!(parsed.problems(), &Problems::new());
        assert_eq!(parsed.fixture().name(), "Dimmer");
    }

    #[test]
    fn load_from_reader() -> anyhow::Result<()> {
        let json = br#"{ "name": "Fog", "availableChannels": { "Fog": { "capability": { "type": "FogOutput" } } } }"#;
        let (fixture, problems) = Fixture::from_reader(&json[..])?.into_parts();
        assert!(problems.is_empty());
        assert_eq!(fixture.coarse_channel("Fog").unwrap().channel_type()?, crate::ChannelType::Fog);
        Ok(())
    }

    #[test]
    fn invalid_json_is_fatal() {
        assert!(matches!(
            ParsedFixture::from_json("{ \"name\": "),
            Err(FixtureParseError::InvalidJson(_))
        ));
        assert!(matches!(
            ParsedFixture::from_json("{}"),
            Err(FixtureParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn recoverable_problems() {
        let parsed = parse(json!({
            "name": "Broken",
            "wheels": {
                "Color Wheel": { "slots": [{ "type": "Open" }, { "type": "Color" }] }
            },
            "availableChannels": {
                "Dimmer": {
                    "fineChannelAliases": ["Strobe"],
                    "capabilities": [
                        { "dmxRange": [0, 100], "type": "NoFunction" },
                        { "dmxRange": [200, 65535], "type": "Intensity" }
                    ]
                },
                "Strobe": { "capability": { "type": "ShutterStrobe", "shutterEffect": "Strobe", "speedStart": "1Hz", "speedEnd": "quick" } },
                "Gobo": { "capability": { "type": "WheelSlot", "wheel": "Gobo Wheel", "slotNumber": 1 } },
                "Function": {
                    "capabilities": [
                        { "dmxRange": [0, 127], "type": "Effect", "effectName": "A", "switchChannels": { "Auto": "Dimmer" } },
                        { "dmxRange": [128, 255], "type": "Effect", "effectName": "B", "switchChannels": { "Other": "Strobe" } }
                    ]
                }
            },
            "modes": [{ "name": "Default", "channels": ["Dimmer", null, "Tilt"] }]
        }));

        let locations: Vec<&str> = parsed.problems().iter().map(|p| p.location()).collect();
        assert_eq!(
            locations,
            [
                "availableChannels/Dimmer",
                "availableChannels/Dimmer/capabilities",
                "availableChannels/Strobe/capabilities",
                "availableChannels/Gobo/capabilities/0",
                "availableChannels/Function/capabilities/1",
                "modes/0/channels/2",
            ]
        );

        let problems: Vec<&Problem> = parsed.problems().iter().map(|p| p.problem()).collect();
        assert_eq!(problems[0], &Problem::DuplicateChannelKey("Strobe".into()));
        assert_eq!(
            problems[1],
            &Problem::CapabilityRanges(ChannelError::CapabilityRangeGap {
                expected: 101,
                found: 200
            })
        );
        assert!(matches!(
            problems[2],
            Problem::InvalidChannel(ChannelError::Entity { field, .. }) if field == "speedEnd"
        ));
        assert_eq!(problems[3], &Problem::UnknownWheel("Gobo Wheel".into()));
        assert_eq!(
            problems[4],
            &Problem::SwitchingAliasMismatch {
                expected: vec!["Auto".into()],
                found: vec!["Other".into()]
            }
        );
        assert_eq!(problems[5], &Problem::UnknownChannel("Tilt".into()));

        // problems don't stop the channels from being used
        let fixture = parsed.fixture();
        assert!(fixture.coarse_channel("Strobe").unwrap().capabilities().is_err());
        assert!(fixture.coarse_channel("Gobo").unwrap().capabilities().unwrap()[0]
            .wheels()
            .is_empty());
        assert_eq!(
            fixture.coarse_channel("Function").unwrap().switching_channel_aliases(),
            ["Auto"]
        );
    }

    #[test]
    fn repeated_channel_key_keeps_first() -> anyhow::Result<()> {
        let parsed = ParsedFixture::from_json(
            r#"{
                "name": "Fixture",
                "availableChannels": {
                    "Dimmer": { "capability": { "type": "Intensity" } },
                    "Dimmer": { "capability": { "type": "Zoom", "angleStart": "10deg", "angleEnd": "40deg" } }
                }
            }"#,
        )?;
        assert_eq!(parsed.problems().len(), 1);
        assert_eq!(parsed.problems()[0].location(), "availableChannels/1");
        assert_eq!(
            parsed.problems()[0].problem(),
            &Problem::DuplicateChannelKey("Dimmer".into())
        );

        let fixture = parsed.fixture();
        assert_eq!(fixture.all_channel_keys(), ["Dimmer"]);
        assert_eq!(
            fixture.coarse_channel("Dimmer").unwrap().channel_type()?,
            crate::ChannelType::Intensity
        );
        Ok(())
    }

    #[test]
    fn fine_channels_beyond_32bit() {
        let parsed = parse(json!({
            "name": "Fixture",
            "availableChannels": {
                "Pan": {
                    "fineChannelAliases": ["f1", "f2", "f3", "f4"],
                    "capability": { "type": "Pan", "angleStart": "0deg", "angleEnd": "540deg" }
                }
            },
            "modes": [{ "name": "Full", "channels": ["Pan", "f1", "f2", "f3", "f4"] }]
        }));
        assert_eq!(parsed.problems().len(), 2);
        assert_eq!(parsed.problems()[0].location(), "availableChannels/Pan/fineChannelAliases");
        assert_eq!(
            parsed.problems()[0].problem(),
            &Problem::TooManyFineChannels {
                fine_channels: 4,
                max: Resolution::BIT32
            }
        );
        assert_eq!(parsed.problems()[1].problem(), &Problem::UnknownChannel("f4".into()));

        let fixture = parsed.fixture();
        let pan = fixture.coarse_channel("Pan").unwrap();
        let mode = fixture.mode("Full").unwrap();
        assert_eq!(pan.max_resolution(), Resolution::BIT32);
        assert_eq!(
            pan.resolution_in_mode(&mode, crate::SwitchingChannelBehavior::All),
            4
        );
    }

    #[test]
    fn unresolvable_default_value() {
        let parsed = parse(json!({
            "name": "Fixture",
            "availableChannels": {
                "Dimmer": { "defaultValue": "half", "capability": { "type": "Intensity" } }
            }
        }));
        assert_eq!(parsed.problems().len(), 1);
        assert!(matches!(
            parsed.problems()[0].problem(),
            Problem::InvalidChannel(ChannelError::DmxValue { .. })
        ));
    }
}
