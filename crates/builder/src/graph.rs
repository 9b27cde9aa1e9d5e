use crate::error::GraphError;
use crate::label::StreamLabel;
use crate::stage::{FilterChain, StageSpec};
use std::collections::HashSet;

/// Stream bookkeeping for a filter graph under construction.
///
/// `active` holds the labels eligible as inputs to the next stage or to
/// output mapping. `chains` is append-only; its order is the serialization
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphState {
    pub active: Vec<StreamLabel>,
    pub chains: Vec<FilterChain>,
    pub input_count: usize,
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` raw inputs, numbered after the ones already registered.
    pub fn with_inputs(&self, count: usize) -> GraphState {
        let mut next = self.clone();
        next.active
            .extend((self.input_count..self.input_count + count).map(StreamLabel::Input));
        next.input_count += count;
        next
    }
}

/// Apply one filter stage, returning the successor state.
///
/// `state` is never modified; on error the caller keeps the old state.
pub fn apply_stage(state: &GraphState, spec: &StageSpec) -> Result<GraphState, GraphError> {
    let mut next = state.clone();

    match *spec {
        StageSpec::Resize { width, height } => {
            if width == 0 || height == 0 {
                return Err(GraphError::InvalidDimensions { width, height });
            }
            let outputs: Vec<StreamLabel> = (0..state.active.len()).map(StreamLabel::Resized).collect();
            next.chains.extend(
                state
                    .active
                    .iter()
                    .zip(&outputs)
                    .map(|(input, output)| FilterChain::scale_pad(*input, width, height, *output)),
            );
            next.active = outputs;
        }
        StageSpec::Concat => {
            if state.active.len() < 2 {
                return Err(GraphError::InsufficientStreams {
                    found: state.active.len(),
                });
            }
            next.chains.push(FilterChain::concat(state.active.clone()));
            next.active = vec![StreamLabel::Concatenated];
        }
    }

    tracing::debug!(
        "applied {:?}: {} -> {} active streams",
        spec,
        state.active.len(),
        next.active.len()
    );
    Ok(next)
}

/// First label produced by `next` that an earlier chain of `prev` already
/// declared as an output.
pub fn reused_output(prev: &GraphState, next: &GraphState) -> Option<StreamLabel> {
    let declared: HashSet<StreamLabel> = prev
        .chains
        .iter()
        .flat_map(|chain| chain.outputs.iter().copied())
        .collect();

    next.chains
        .iter()
        .skip(prev.chains.len())
        .flat_map(|chain| chain.outputs.iter().copied())
        .find(|label| declared.contains(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::FilterOp;

    #[test]
    fn test_with_inputs_numbers_after_existing() {
        let state = GraphState::new().with_inputs(2).with_inputs(1);
        assert_eq!(
            state.active,
            vec![
                StreamLabel::Input(0),
                StreamLabel::Input(1),
                StreamLabel::Input(2)
            ]
        );
        assert_eq!(state.input_count, 3);
    }

    #[test]
    fn test_resize_replaces_active_set() {
        let state = GraphState::new().with_inputs(2);
        let next = apply_stage(&state, &StageSpec::Resize { width: 1280, height: 720 }).unwrap();

        assert_eq!(next.active, vec![StreamLabel::Resized(0), StreamLabel::Resized(1)]);
        assert_eq!(next.chains.len(), 2);
        assert_eq!(next.chains[1].inputs, vec![StreamLabel::Input(1)]);
        assert_eq!(
            next.chains[1].op,
            FilterOp::ScalePad { width: 1280, height: 720 }
        );
        // Original untouched
        assert_eq!(state.active.len(), 2);
        assert!(state.chains.is_empty());
    }

    #[test]
    fn test_resize_on_empty_set_is_noop() {
        let state = GraphState::new();
        let next = apply_stage(&state, &StageSpec::Resize { width: 10, height: 10 }).unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let state = GraphState::new().with_inputs(1);
        assert_eq!(
            apply_stage(&state, &StageSpec::Resize { width: 0, height: 720 }),
            Err(GraphError::InvalidDimensions { width: 0, height: 720 })
        );
        assert_eq!(
            apply_stage(&state, &StageSpec::Resize { width: 1280, height: 0 }),
            Err(GraphError::InvalidDimensions { width: 1280, height: 0 })
        );
    }

    #[test]
    fn test_reused_output_detects_second_resize() {
        let state = GraphState::new().with_inputs(2);
        let spec = StageSpec::Resize { width: 100, height: 100 };
        let once = apply_stage(&state, &spec).unwrap();
        let twice = apply_stage(&once, &spec).unwrap();

        assert_eq!(reused_output(&state, &once), None);
        assert_eq!(reused_output(&once, &twice), Some(StreamLabel::Resized(0)));
    }

    #[test]
    fn test_concat_reduces_to_single_label() {
        let state = GraphState::new().with_inputs(3);
        let next = apply_stage(&state, &StageSpec::Concat).unwrap();

        assert_eq!(next.active, vec![StreamLabel::Concatenated]);
        assert_eq!(next.chains.len(), 1);
        assert_eq!(next.chains[0].op, FilterOp::Concat { segments: 3 });
    }

    #[test]
    fn test_concat_after_concat_fails() {
        let state = GraphState::new().with_inputs(2);
        let once = apply_stage(&state, &StageSpec::Concat).unwrap();
        assert_eq!(
            apply_stage(&once, &StageSpec::Concat),
            Err(GraphError::InsufficientStreams { found: 1 })
        );
    }

    #[test]
    fn test_repeated_resize_renumbers_by_position() {
        let state = GraphState::new().with_inputs(2);
        let spec = StageSpec::Resize { width: 100, height: 100 };
        let next = apply_stage(&apply_stage(&state, &spec).unwrap(), &spec).unwrap();

        assert_eq!(next.chains.len(), 4);
        assert_eq!(next.chains[2].inputs, vec![StreamLabel::Resized(0)]);
        assert_eq!(next.active, vec![StreamLabel::Resized(0), StreamLabel::Resized(1)]);
    }
}
