//! Sonic Playground entry point
//!
//! Native builds run a headless demo scene and log what it would play.
//! In the browser the library's `web::Playground` is driven by the page.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::collections::BTreeMap;

    use glam::Vec2;
    use sonic_playground::SimConfig;
    use sonic_playground::audio::NoteRequest;
    use sonic_playground::sim::{self, BallKind, Command, ShapeKind, SimulationState, Voice};

    env_logger::init();
    log::info!("Sonic Playground (native) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match SimConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {path}: {e}");
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };
    let frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(600);

    let mut state = SimulationState::new(config);
    let (w, h) = (state.config.canvas.width, state.config.canvas.height);

    for (i, kind) in BallKind::ALL.into_iter().enumerate() {
        let x = w * (i as f32 + 1.0) / 4.0;
        sim::apply(&mut state, Command::PlaceBall { at: Vec2::new(x, h * 0.5), kind });
    }
    sim::apply(
        &mut state,
        Command::FinalizePolygon {
            points: vec![
                Vec2::new(w * 0.2, h * 0.2),
                Vec2::new(w * 0.4, h * 0.2),
                Vec2::new(w * 0.3, h * 0.4),
            ],
        },
    );
    sim::apply(
        &mut state,
        Command::PlaceShape {
            kind: ShapeKind::Circle,
            center: Vec2::new(w * 0.7, h * 0.7),
            radius: 40.0,
        },
    );
    sim::apply(
        &mut state,
        Command::DrawArrow {
            start: Vec2::new(w * 0.5, h * 0.8),
            end: Vec2::new(w * 0.8, h * 0.8),
        },
    );
    if let sim::Outcome::Created(stroke) = sim::apply(&mut state, Command::BeginStroke { at: Vec2::new(0.0, h * 0.3) }) {
        sim::apply(&mut state, Command::ExtendStroke { stroke, to: Vec2::new(w, h * 0.3) });
        sim::apply(&mut state, Command::EndStroke { stroke });
    }

    let dt = 1.0 / 60.0;
    let mut totals: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut mean_hz = 0.0f64;
    let mut notes_played = 0usize;
    for _ in 0..frames {
        let events = sim::advance(&mut state, dt);
        for note in NoteRequest::from_events(&events, state.config.canvas, &state.controls) {
            let name = match note.voice {
                Voice::Ball(kind) => kind.as_str(),
                Voice::Playhead => "playhead",
            };
            *totals.entry(name).or_default() += 1;
            notes_played += 1;
            mean_hz += (note.frequency as f64 - mean_hz) / notes_played as f64;
        }
    }

    log::info!("Ran {frames} frames ({:.1}s simulated)", state.time);
    for (voice, count) in &totals {
        log::info!("  {voice}: {count} note(s)");
    }
    if notes_played > 0 {
        log::info!("Mean frequency: {mean_hz:.1} Hz");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser builds start from web::start
}
