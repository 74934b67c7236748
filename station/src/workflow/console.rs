use radarcore::UiIntent;

pub const PRESET_ANGLES: [i32; 5] = [0, 45, 90, 135, 180];

pub const HELP: &str = "commands: auto | angle <0-180> | preset <0|45|90|135|180> | \
calibrate <cm> | cancel | clear | status | help | quit";

/// Operator command typed on the station console.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Intent(UiIntent),
    Status,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".into());
    };
    let argument = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments for '{}'", verb));
    }

    match (verb.to_ascii_lowercase().as_str(), argument) {
        ("auto", None) => Ok(ConsoleCommand::Intent(UiIntent::ToggleAuto)),
        ("angle", Some(value)) => {
            let angle: i32 = value
                .parse()
                .map_err(|_| format!("'{}' is not a whole angle", value))?;
            if !(0..=180).contains(&angle) {
                return Err(format!("angle {} outside 0-180", angle));
            }
            Ok(ConsoleCommand::Intent(UiIntent::SetAngle(angle)))
        }
        ("preset", Some(value)) => match value.parse::<i32>() {
            Ok(angle) if PRESET_ANGLES.contains(&angle) => {
                Ok(ConsoleCommand::Intent(UiIntent::SetAngle(angle)))
            }
            _ => Err(format!("presets are {:?}", PRESET_ANGLES)),
        },
        ("calibrate", Some(value)) => {
            let known_height: f32 = value
                .parse()
                .map_err(|_| format!("'{}' is not a height in cm", value))?;
            Ok(ConsoleCommand::Intent(UiIntent::Calibrate { known_height }))
        }
        ("cancel", None) => Ok(ConsoleCommand::Intent(UiIntent::CancelCalibration)),
        ("clear", None) => Ok(ConsoleCommand::Intent(UiIntent::ClearHistory)),
        ("status", None) => Ok(ConsoleCommand::Status),
        ("help", None) => Ok(ConsoleCommand::Help),
        ("quit" | "exit", None) => Ok(ConsoleCommand::Quit),
        (other, _) => Err(format!("unknown command '{}'; {}", other, HELP)),
    }
}
