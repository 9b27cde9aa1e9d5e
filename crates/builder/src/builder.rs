use crate::config::{create_profile, EncodingOptions, EncodingProfile, SequencingPolicy};
use crate::error::GraphError;
use crate::graph::{apply_stage, reused_output, GraphState};
use crate::label::StreamLabel;
use crate::stage::{format_filter_graph, FilterChain, StageSpec};

/// Frame sync directive emitted right after the filter graph.
pub const VSYNC_MODE: &str = "2";

/// Progress of a [`CommandBuilder`] through its call sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderPhase {
    Empty,
    HasInputs,
    HasStages,
    GraphFinalized,
    MappingFinalized,
}

/// Fluent assembly of an ffmpeg argument list.
///
/// Typical use:
///
/// ```no_run
/// # use ffgraph_builder::{CommandBuilder, EncodingOptions};
/// # fn main() -> Result<(), ffgraph_builder::GraphError> {
/// let mut builder = CommandBuilder::new(&EncodingOptions::default())?;
/// builder
///     .register_inputs(["./1.mp4", "./2.mp4"])?
///     .apply_resize_filter(1920, 1080)?
///     .apply_concat_filter()?
///     .finalize_filter_graph()?
///     .finalize_output_mapping()?;
/// let args = builder.into_args();
/// # Ok(())
/// # }
/// ```
///
/// Under [`SequencingPolicy::Permissive`] only `apply_concat_filter` can
/// fail. Calling `finalize_filter_graph` twice appends the graph twice.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    profile: EncodingProfile,
    policy: SequencingPolicy,
    args: Vec<String>,
    state: GraphState,
    phase: BuilderPhase,
}

impl CommandBuilder {
    /// Resolve `options` into a profile and start a new argument list.
    pub fn new(options: &EncodingOptions) -> Result<Self, GraphError> {
        Ok(Self::with_profile(create_profile(options)?, SequencingPolicy::Permissive))
    }

    pub fn with_profile(profile: EncodingProfile, policy: SequencingPolicy) -> Self {
        let mut args = Vec::new();
        if profile.overwrite_existing {
            args.push("-y".to_string());
        }

        Self {
            profile,
            policy,
            args,
            state: GraphState::new(),
            phase: BuilderPhase::Empty,
        }
    }

    fn check(&self, operation: &'static str, allowed: &[BuilderPhase]) -> Result<(), GraphError> {
        if self.policy == SequencingPolicy::Strict && !allowed.contains(&self.phase) {
            return Err(GraphError::Sequencing {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// Declare input files; each one becomes an active `[i:v]` stream.
    pub fn register_inputs<I, S>(&mut self, paths: I) -> Result<&mut Self, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check(
            "register_inputs",
            &[BuilderPhase::Empty, BuilderPhase::HasInputs],
        )?;

        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            return Ok(self);
        }

        for path in &paths {
            self.args.push("-i".to_string());
            self.args.push(path.clone());
        }
        self.state = self.state.with_inputs(paths.len());
        if self.phase == BuilderPhase::Empty {
            self.phase = BuilderPhase::HasInputs;
        }

        tracing::debug!("registered {} inputs, {} total", paths.len(), self.state.input_count);
        Ok(self)
    }

    /// Apply a stage through [`apply_stage`], committing only on success.
    pub fn apply(&mut self, spec: StageSpec) -> Result<&mut Self, GraphError> {
        let operation = match spec {
            StageSpec::Resize { .. } => "apply_resize_filter",
            StageSpec::Concat => "apply_concat_filter",
        };
        self.check(operation, &[BuilderPhase::HasInputs, BuilderPhase::HasStages])?;

        let next = apply_stage(&self.state, &spec)?;
        if self.policy == SequencingPolicy::Strict {
            if let Some(label) = reused_output(&self.state, &next) {
                return Err(GraphError::LabelReuse { label });
            }
        }
        self.state = next;
        if matches!(self.phase, BuilderPhase::Empty | BuilderPhase::HasInputs) {
            self.phase = BuilderPhase::HasStages;
        }
        Ok(self)
    }

    /// Scale and pad every active stream to exactly `width`x`height`.
    ///
    /// Both dimensions must be non-zero. Under [`SequencingPolicy::Strict`]
    /// a second resize is rejected because it would redefine `[resized<i>]`.
    pub fn apply_resize_filter(&mut self, width: u32, height: u32) -> Result<&mut Self, GraphError> {
        self.apply(StageSpec::Resize { width, height })
    }

    /// Concatenate all active streams into `[concatenated]`.
    pub fn apply_concat_filter(&mut self) -> Result<&mut Self, GraphError> {
        self.apply(StageSpec::Concat)
    }

    /// Append `-filter_complex <graph> -vsync 2` if any chain was recorded.
    pub fn finalize_filter_graph(&mut self) -> Result<&mut Self, GraphError> {
        self.check(
            "finalize_filter_graph",
            &[BuilderPhase::HasInputs, BuilderPhase::HasStages],
        )?;

        if !self.state.chains.is_empty() {
            let graph = format_filter_graph(&self.state.chains);
            tracing::debug!("filter graph: {}", graph);
            self.args.extend([
                "-filter_complex".to_string(),
                graph,
                "-vsync".to_string(),
                VSYNC_MODE.to_string(),
            ]);
        }
        if self.phase != BuilderPhase::MappingFinalized {
            self.phase = BuilderPhase::GraphFinalized;
        }
        Ok(self)
    }

    /// Map every active stream to its own output file.
    pub fn finalize_output_mapping(&mut self) -> Result<&mut Self, GraphError> {
        self.check(
            "finalize_output_mapping",
            &[BuilderPhase::HasInputs, BuilderPhase::GraphFinalized],
        )?;

        let params = self.profile.output_params();
        for label in &self.state.active {
            self.args.extend(params.iter().cloned());
            self.args.push("-map".to_string());
            self.args.push(label.to_string());
            self.args.push(label.output_filename());
        }
        self.phase = BuilderPhase::MappingFinalized;

        tracing::debug!("mapped {} outputs", self.state.active.len());
        Ok(self)
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }

    pub fn active_streams(&self) -> &[StreamLabel] {
        &self.state.active
    }

    pub fn filter_chains(&self) -> &[FilterChain] {
        &self.state.chains
    }

    pub fn input_count(&self) -> usize {
        self.state.input_count
    }

    pub fn profile(&self) -> &EncodingProfile {
        &self.profile
    }

    pub fn phase(&self) -> BuilderPhase {
        self.phase
    }
}
