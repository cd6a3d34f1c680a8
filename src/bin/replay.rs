// Headless driver for the drawing engine: replays a recorded session and saves the result.
//
// Usage:
//   painter-replay --script session.json --output drawing.png
//   painter-replay -s session.json -o drawing.jpg --settings settings.json
//
// A script is a JSON array of steps, for example:
//   [
//     { "action": "set", "field": "mode", "value": "LINE" },
//     { "action": "down", "x": 10, "y": 10 },
//     { "action": "move", "x": 80, "y": 40 },
//     { "action": "up", "x": 120, "y": 60 },
//     { "action": "undo" }
//   ]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use egui::Pos2;
use serde::Deserialize;

use painter::{BrushModel, Canvas, CanvasResult, InputEvent, Settings, Size};

/// Replay pointer gestures and brush changes against a blank canvas.
#[derive(Parser, Debug)]
#[command(name = "painter-replay", about = "Replay a drawing session without a window")]
struct Args {
    /// JSON file with the steps to replay
    #[arg(short, long, value_name = "SCRIPT.json")]
    script: PathBuf,

    /// Image to write once the script has run; the format follows the extension
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Settings file with the canvas setup and starting brush
    #[arg(long, value_name = "SETTINGS.json")]
    settings: Option<PathBuf>,

    /// Print the status line after every step
    #[arg(short, long)]
    verbose: bool,
}

/// One recorded action
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Step {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up { x: f32, y: f32 },
    Set { field: String, value: String },
    Undo,
    Clear,
    Resize { width: u32, height: u32 },
    Open { path: PathBuf },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("error: {}: {}", path.display(), err);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    let steps: Vec<Step> = match std::fs::read_to_string(&args.script)
        .map_err(|err| err.to_string())
        .and_then(|json| serde_json::from_str(&json).map_err(|err| err.to_string()))
    {
        Ok(steps) => steps,
        Err(err) => {
            eprintln!("error: {}: {}", args.script.display(), err);
            return ExitCode::FAILURE;
        }
    };

    let mut canvas = match Canvas::with_config(&settings.canvas) {
        Ok(canvas) => canvas,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let mut brush = settings.brush;

    for (index, step) in steps.iter().enumerate() {
        match run_step(&mut canvas, &mut brush, step) {
            Ok(status) if args.verbose => println!("{:>4}: {}", index + 1, status),
            Ok(_) => {}
            Err(err) => {
                eprintln!("error: step {} ({:?}): {}", index + 1, step, err);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Err(err) = canvas.save(&args.output) {
        eprintln!("error: {}", err);
        return ExitCode::FAILURE;
    }
    log::info!("Replayed {} steps into {}", steps.len(), args.output.display());
    ExitCode::SUCCESS
}

fn run_step(canvas: &mut Canvas, brush: &mut BrushModel, step: &Step) -> CanvasResult<String> {
    match step {
        Step::Down { x, y } => canvas.handle_input(
            &InputEvent::PointerDown { position: Pos2::new(*x, *y) },
            brush,
        ),
        Step::Move { x, y } => canvas.handle_input(
            &InputEvent::PointerMove { position: Pos2::new(*x, *y) },
            brush,
        ),
        Step::Up { x, y } => canvas.handle_input(
            &InputEvent::PointerUp { position: Pos2::new(*x, *y) },
            brush,
        ),
        Step::Set { field, value } => {
            brush.set_attribute(field, value)?;
            Ok(canvas.status())
        }
        Step::Undo => {
            canvas.undo();
            Ok(canvas.status())
        }
        Step::Clear => {
            canvas.clear();
            Ok(canvas.status())
        }
        Step::Resize { width, height } => {
            canvas.resize(Size::new(*width, *height)?);
            Ok(canvas.status())
        }
        Step::Open { path } => {
            canvas.open(path)?;
            Ok(canvas.status())
        }
    }
}
