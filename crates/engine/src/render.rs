use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::compiler::TRANSITION_OVERLAP_SECS;
use crate::error::{TimelineError, TimelineResult};
use crate::profile::OutputProfile;
use crate::timeline::{Timeline, TimelineEntry};

pub const DEFAULT_ARTIFACT_NAME: &str = "generated.mp4";
pub const AUDIO_CODEC: &str = "aac";
pub const PIXEL_FORMAT: &str = "yuv420p";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputOptions {
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_input: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim_duration_seconds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderInput {
    pub locator: String,
    #[serde(default)]
    pub options: InputOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncatePolicy {
    Shortest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDirectives {
    pub video_codec: String,
    pub video_bitrate: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub preset: String,
    pub crf: u8,
    /// `[video, audio]`.
    pub stream_maps: Vec<String>,
    pub truncate: TruncatePolicy,
    pub pixel_format: String,
    pub aspect_ratio: String,
    pub frame_rate: u32,
    pub artifact_name: String,
}

/// Declarative job handed to the external rendering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJobSpec {
    /// Media inputs in timeline order, then the audio input.
    pub inputs: Vec<RenderInput>,
    pub filter_chain: Vec<String>,
    pub output: OutputDirectives,
}

/// What the engine reports back for a finished job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderOutcome {
    #[serde(default)]
    pub artifacts: BTreeMap<String, String>,
    #[serde(default)]
    pub logs: serde_json::Value,
}

impl RenderOutcome {
    pub fn artifact(&self, name: &str) -> Option<&str> {
        self.artifacts.get(name).map(String::as_str)
    }
}

/// Resolved locations the builder needs besides the timeline itself.
#[derive(Debug, Clone, Default)]
pub struct RenderSources {
    /// Segment id -> resolved media locator.
    pub media: HashMap<Uuid, String>,
    /// Narration/audio locator.
    pub audio: Option<String>,
}

/// Build the render job for a compiled timeline.
///
/// Emits one input per segment plus the audio input, and a filter chain of
/// `2N - 1` expressions: a scale/pad/loop stage per segment followed by one
/// transition join per adjacent pair.
pub fn build_render_job(
    timeline: &Timeline,
    profile: &OutputProfile,
    sources: &RenderSources,
    artifact_name: &str,
) -> TimelineResult<RenderJobSpec> {
    if timeline.is_empty() {
        return Err(TimelineError::EmptyTimeline);
    }
    let audio = sources
        .audio
        .as_deref()
        .filter(|locator| !locator.trim().is_empty())
        .ok_or(TimelineError::MissingAudioInput)?;

    let entries = timeline.entries();
    let mut inputs = Vec::with_capacity(entries.len() + 1);
    let mut filter_chain = Vec::with_capacity(entries.len() * 2 - 1);

    for (idx, entry) in entries.iter().enumerate() {
        let segment = &entry.segment;
        let locator = sources
            .media
            .get(&segment.id)
            .ok_or(TimelineError::UnresolvedSource {
                segment_id: segment.id,
            })?;

        inputs.push(RenderInput {
            locator: locator.clone(),
            options: InputOptions {
                loop_input: segment.is_photo().then_some(true),
                trim_duration_seconds: Some(segment.duration),
            },
        });
        filter_chain.push(input_stage(idx, entry, timeline, profile));
    }

    // Joins run against the composite built so far, so each offset comes from
    // the composite's running length rather than from per-segment offsets.
    let mut current = stream_label(0);
    let mut composite_secs = entries[0].segment.duration;
    for (idx, entry) in entries.iter().enumerate().skip(1) {
        let offset = composite_secs - TRANSITION_OVERLAP_SECS;
        debug_assert!((offset - entry.start_offset_secs).abs() < 1e-9);

        let joined = join_label(idx);
        filter_chain.push(format!(
            "[{}][{}]xfade=transition={}:duration={}:offset={}[{}]",
            current,
            stream_label(idx),
            entry.segment.transition,
            TRANSITION_OVERLAP_SECS,
            offset,
            joined
        ));
        composite_secs = offset + entry.segment.duration;
        current = joined;
    }

    inputs.push(RenderInput {
        locator: audio.to_string(),
        options: InputOptions::default(),
    });

    let output = OutputDirectives {
        video_codec: profile.video_codec.encoder().to_string(),
        video_bitrate: profile.video_bitrate.to_string(),
        audio_codec: AUDIO_CODEC.to_string(),
        audio_bitrate: profile.audio_bitrate.to_string(),
        preset: profile.preset.to_string(),
        crf: profile.crf,
        stream_maps: vec![format!("[{}]", current), format!("{}:a", entries.len())],
        truncate: TruncatePolicy::Shortest,
        pixel_format: PIXEL_FORMAT.to_string(),
        aspect_ratio: timeline.aspect_ratio.to_string(),
        frame_rate: timeline.frame_rate.as_u32(),
        artifact_name: artifact_name.to_string(),
    };

    Ok(RenderJobSpec {
        inputs,
        filter_chain,
        output,
    })
}

fn stream_label(idx: usize) -> String {
    format!("v{}", idx)
}

fn join_label(idx: usize) -> String {
    format!("x{}", idx)
}

fn input_stage(idx: usize, entry: &TimelineEntry, timeline: &Timeline, profile: &OutputProfile) -> String {
    let (w, h) = profile.dimensions();
    let fps = timeline.frame_rate;
    let mut stage = format!(
        "[{idx}:v]scale=w={w}:h={h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1"
    );
    if entry.segment.is_photo() {
        let frames = fps.frames_for(entry.segment.duration);
        stage.push_str(&format!(",loop={frames}:{frames}:0"));
    }
    stage.push_str(&format!(",fps={}[{}]", fps, stream_label(idx)));
    stage
}

impl RenderJobSpec {
    /// Lower the job to an ffmpeg command line (without the program name).
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        for input in &self.inputs {
            if input.options.loop_input == Some(true) {
                args.push("-loop".to_string());
                args.push("1".to_string());
            }
            if let Some(duration) = input.options.trim_duration_seconds {
                args.push("-t".to_string());
                args.push(duration.to_string());
            }
            args.push("-i".to_string());
            args.push(input.locator.clone());
        }

        let out = &self.output;
        args.push("-filter_complex".to_string());
        args.push(self.filter_chain.join(";"));
        for map in &out.stream_maps {
            args.push("-map".to_string());
            args.push(map.clone());
        }
        args.extend([
            "-c:v".to_string(),
            out.video_codec.clone(),
            "-b:v".to_string(),
            out.video_bitrate.clone(),
            "-preset".to_string(),
            out.preset.clone(),
            "-crf".to_string(),
            out.crf.to_string(),
            "-c:a".to_string(),
            out.audio_codec.clone(),
            "-b:a".to_string(),
            out.audio_bitrate.clone(),
        ]);
        match out.truncate {
            TruncatePolicy::Shortest => args.push("-shortest".to_string()),
        }
        args.extend([
            "-pix_fmt".to_string(),
            out.pixel_format.clone(),
            "-aspect".to_string(),
            out.aspect_ratio.clone(),
            "-r".to_string(),
            out.frame_rate.to_string(),
            "-y".to_string(),
            out.artifact_name.clone(),
        ]);
        args
    }
}
