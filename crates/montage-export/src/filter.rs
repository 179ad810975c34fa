//! Typed filter-graph intermediate representation.
//!
//! The composition program is built as a tree of trim/shift/scale/overlay/
//! delay/volume/mix nodes, validated, and only then serialized to the
//! encoder's `filter_complex` syntax. Synthesis logic stays unit-testable
//! and malformed programs are caught before a process is ever spawned.

use std::collections::HashSet;
use std::fmt::Write as _;

use montage_core::{MontageError, Result};

/// One filter primitive.
///
/// Times are output-clock seconds unless noted; rendering uses fixed
/// four-decimal precision so the serialized program is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Keep `[start, end)` of a video source's own clock.
    Trim { start: f64, end: f64 },
    /// Rebase timestamps to zero, then shift by `offset` so the stream
    /// lands at `offset` on the output clock.
    SetPtsOffset { offset: f64 },
    /// Aspect-preserving scale with pad to exactly `width`×`height`.
    Scale { width: u32, height: u32 },
    /// Composite the second input over the first, enabled only inside
    /// `[from, until)`.
    Overlay { from: f64, until: f64 },
    /// Video pass-through.
    Null,
    /// Keep `[start, end)` of an audio source's own clock.
    ATrim { start: f64, end: f64 },
    /// Rebase audio timestamps to zero.
    AResetPts,
    /// Shift audio to start `millis` into the output clock.
    Delay { millis: u64 },
    /// Constant gain.
    Volume { gain: f64 },
    /// Sum `inputs` streams; output length follows the longest input.
    AMix { inputs: usize },
    /// Audio pass-through.
    ANull,
}

impl FilterOp {
    /// Number of input streams this op consumes.
    pub fn arity(&self) -> usize {
        match self {
            Self::Overlay { .. } => 2,
            Self::AMix { inputs } => *inputs,
            _ => 1,
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(MontageError::InvalidParameter(msg));
        match self {
            Self::Trim { start, end } | Self::ATrim { start, end } => {
                if *start < 0.0 || end <= start {
                    return invalid(format!("trim range [{start}, {end}) is empty or negative"));
                }
            }
            Self::Scale { width, height } => {
                if *width == 0 || *height == 0 {
                    return invalid("scale to zero dimensions".into());
                }
            }
            Self::Overlay { from, until } => {
                if until <= from {
                    return invalid(format!("overlay window [{from}, {until}) is empty"));
                }
            }
            Self::Volume { gain } => {
                if *gain < 0.0 || !gain.is_finite() {
                    return invalid(format!("volume gain {gain} out of range"));
                }
            }
            Self::AMix { inputs } => {
                if *inputs < 2 {
                    return invalid("amix needs at least two inputs".into());
                }
            }
            Self::SetPtsOffset { offset } => {
                if !offset.is_finite() {
                    return invalid("non-finite pts offset".into());
                }
            }
            Self::Null | Self::ANull | Self::AResetPts | Self::Delay { .. } => {}
        }
        Ok(())
    }

    fn render(&self) -> String {
        match self {
            Self::Trim { start, end } => format!("trim=start={start:.4}:end={end:.4}"),
            Self::SetPtsOffset { offset } => {
                if *offset == 0.0 {
                    "setpts=PTS-STARTPTS".into()
                } else {
                    format!("setpts=PTS-STARTPTS+{offset:.4}/TB")
                }
            }
            Self::Scale { width, height } => format!(
                "scale={width}:{height}:force_original_aspect_ratio=decrease,\
                 pad={width}:{height}:(ow-iw)/2:(oh-ih)/2"
            ),
            Self::Overlay { from, until } => format!(
                "overlay=eof_action=pass:enable='between(t,{from:.4},{until:.4})'"
            ),
            Self::Null => "null".into(),
            Self::ATrim { start, end } => format!("atrim=start={start:.4}:end={end:.4}"),
            Self::AResetPts => "asetpts=PTS-STARTPTS".into(),
            Self::Delay { millis } => format!("adelay={millis}:all=1"),
            Self::Volume { gain } => format!("volume={gain:.4}"),
            Self::AMix { inputs } => {
                format!("amix=inputs={inputs}:duration=longest:normalize=0")
            }
            Self::ANull => "anull".into(),
        }
    }
}

/// A linear chain: labeled inputs, ops applied in order, one labeled
/// output. The first op consumes every input; the rest are unary.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    pub inputs: Vec<String>,
    pub ops: Vec<FilterOp>,
    pub output: String,
}

impl FilterChain {
    pub fn new(
        inputs: impl IntoIterator<Item = String>,
        ops: Vec<FilterOp>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            ops,
            output: output.into(),
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for input in &self.inputs {
            let _ = write!(out, "[{input}]");
        }
        let rendered: Vec<String> = self.ops.iter().map(FilterOp::render).collect();
        let _ = write!(out, "{}[{}]", rendered.join(","), self.output);
        out
    }
}

/// The whole composition program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    pub chains: Vec<FilterChain>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chain: FilterChain) {
        self.chains.push(chain);
    }

    /// Validate the program: every op well-formed, chain arities correct,
    /// every label defined before use, no duplicate outputs.
    pub fn validate(&self) -> Result<()> {
        let mut defined: HashSet<&str> = HashSet::new();
        for chain in &self.chains {
            let Some(first) = chain.ops.first() else {
                return Err(MontageError::InvalidParameter(format!(
                    "filter chain [{}] has no ops",
                    chain.output
                )));
            };
            if first.arity() != chain.inputs.len() {
                return Err(MontageError::InvalidParameter(format!(
                    "filter chain [{}]: op wants {} inputs, got {}",
                    chain.output,
                    first.arity(),
                    chain.inputs.len()
                )));
            }
            for op in &chain.ops[1..] {
                if op.arity() != 1 {
                    return Err(MontageError::InvalidParameter(format!(
                        "filter chain [{}]: multi-input op must lead its chain",
                        chain.output
                    )));
                }
            }
            for op in &chain.ops {
                op.validate()?;
            }
            for input in &chain.inputs {
                let is_source_pad = input.contains(':');
                if !is_source_pad && !defined.contains(input.as_str()) {
                    return Err(MontageError::InvalidParameter(format!(
                        "filter chain [{}] uses undefined label [{input}]",
                        chain.output
                    )));
                }
            }
            if !defined.insert(chain.output.as_str()) {
                return Err(MontageError::InvalidParameter(format!(
                    "duplicate filter output label [{}]",
                    chain.output
                )));
            }
        }
        Ok(())
    }

    /// Serialize to `filter_complex` syntax.
    pub fn render(&self) -> String {
        let chains: Vec<String> = self.chains.iter().map(FilterChain::render).collect();
        chains.join(";")
    }
}
