//! Browser bindings
//!
//! Thin `wasm_bindgen` wrappers so the page scripts can drive layout and
//! round sequencing. DOM work stays on the JavaScript side.

use wasm_bindgen::prelude::*;

use crate::audio::WebAudioOutput;
use crate::consts::MAX_OBJECT_COUNT;
use crate::platform;
use crate::session::GameSession;
use crate::settings::Settings;
use crate::sim::{
    Answer, PendingAnswer, PlacementRequest, Prompt, QuizKind, Size, Stage, Verdict, place,
};

#[wasm_bindgen(start)]
pub fn start() {
    platform::init_logging();
    log::info!("playroom loaded");
}

fn browser_rng() -> rand_pcg::Pcg32 {
    use rand::SeedableRng;
    rand_pcg::Pcg32::seed_from_u64((js_sys::Math::random() * u64::MAX as f64) as u64)
}

/// Lay out `count` objects; returns `[x0, y0, x1, y1, ...]`.
/// `count` is capped at `MAX_OBJECT_COUNT`; sizes must be finite.
#[wasm_bindgen]
pub fn place_objects(
    count: u32,
    width: f32,
    height: f32,
    object_w: f32,
    object_h: f32,
) -> Result<Vec<f32>, JsValue> {
    if ![width, height, object_w, object_h].iter().all(|v| v.is_finite()) {
        return Err(JsValue::from_str("play area and object size must be finite"));
    }
    let request = PlacementRequest::new(
        count.min(MAX_OBJECT_COUNT) as usize,
        Size::new(width, height),
        Size::new(object_w, object_h),
    );
    Ok(place(&request, &mut browser_rng())
        .into_iter()
        .flat_map(|p| [p.x, p.y])
        .collect())
}

/// Counting game session driven from JavaScript
#[wasm_bindgen]
pub struct WebSession {
    session: GameSession,
    audio: WebAudioOutput,
    pending: Option<PendingAnswer<Answer>>,
    settings: Settings,
}

#[wasm_bindgen]
impl WebSession {
    #[wasm_bindgen(constructor)]
    pub fn new(max: u32, width: f32, height: f32, object_size: f32) -> Result<WebSession, JsValue> {
        let settings = Settings::load();
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
        let stage = Stage {
            bounds: Size::new(width, height),
            object_size: Size::square(object_size),
        };
        let session = GameSession::new(QuizKind::Counting { max }, seed, &stage, &settings)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WebSession {
            session,
            audio: WebAudioOutput::new(),
            pending: None,
            settings,
        })
    }

    /// Object positions for the current round, flattened
    pub fn positions(&self) -> Vec<f32> {
        match self.session.prompt() {
            Prompt::Count { layout } => layout.positions.iter().flat_map(|p| [p.x, p.y]).collect(),
            _ => Vec::new(),
        }
    }

    /// Option values in display order
    pub fn options(&self) -> Vec<u32> {
        self.session
            .round()
            .options()
            .iter()
            .filter_map(|a| match a {
                Answer::Number(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Start an answer; returns false when it was dropped
    pub fn submit(&mut self, value: u32) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.audio.resume();
        self.pending = self.session.submit(Answer::Number(value), platform::now_ms());
        self.flush_audio();
        self.pending.is_some()
    }

    /// Apply the pending answer once audio is ready.
    /// Returns "correct", "incorrect" or "" when nothing was applied.
    pub fn resolve(&mut self) -> String {
        let Some(pending) = self.pending.take() else {
            return String::new();
        };
        let verdict = self.session.resolve(pending, platform::now_ms());
        self.flush_audio();
        match verdict {
            Some(Verdict::Correct) => "correct".to_string(),
            Some(Verdict::Incorrect) => "incorrect".to_string(),
            None => String::new(),
        }
    }

    /// Call from a timer / animation frame; returns true when input is enabled
    pub fn tick(&mut self) -> bool {
        self.session.tick(platform::now_ms());
        self.flush_audio();
        self.session.accepts_input()
    }

    /// Next round after the completion dialog; the play area is re-measured
    pub fn advance(&mut self, width: f32, height: f32, object_size: f32) -> Result<(), JsValue> {
        let stage = Stage {
            bounds: Size::new(width, height),
            object_size: Size::square(object_size),
        };
        self.session
            .advance(&stage, platform::now_ms())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        // Anything still pending belonged to the old round
        self.pending = None;
        Ok(())
    }

    /// Cancel an answer that was submitted but will not be resolved
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.session.abandon(pending);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.settings.volume = volume.clamp(0.0, 1.0);
        self.session.mixer_mut().apply_settings(&self.settings);
        self.settings.save();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.session.mixer_mut().apply_settings(&self.settings);
        self.flush_audio();
        self.settings.save();
    }

    fn flush_audio(&mut self) {
        for command in self.session.mixer_mut().drain_commands() {
            self.audio.apply(command);
        }
    }
}
