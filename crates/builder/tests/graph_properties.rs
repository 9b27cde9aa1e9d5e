use ffgraph_builder::graph::{apply_stage, GraphState};
use ffgraph_builder::stage::StageSpec;
use ffgraph_builder::{create_profile, CommandBuilder, EncodingOptions, GraphError, StreamLabel};
use proptest::prelude::*;

fn arb_paths(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z0-9_]{1,12}\\.mp4", 0..max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every CRF in [0, 51] is accepted unchanged.
    #[test]
    fn prop_valid_crf_accepted(crf in 0i64..=51i64) {
        let profile = create_profile(&EncodingOptions { crf: Some(crf), ..Default::default() });
        prop_assert!(profile.is_ok());
        prop_assert_eq!(profile.unwrap().crf as i64, crf);
    }

    /// Every CRF outside [0, 51] is a configuration error.
    #[test]
    fn prop_invalid_crf_rejected(
        crf in prop_oneof![i64::MIN..0i64, 52i64..i64::MAX]
    ) {
        let result = CommandBuilder::new(&EncodingOptions { crf: Some(crf), ..Default::default() });
        prop_assert_eq!(result.unwrap_err(), GraphError::Configuration { crf });
    }

    /// Registering n paths adds n labels in order and 2n tokens.
    #[test]
    fn prop_register_inputs_grows_by_n(first in arb_paths(4), second in arb_paths(6)) {
        let mut builder = CommandBuilder::new(&EncodingOptions::default()).unwrap();
        builder.register_inputs(first.clone()).unwrap();

        let args_before = builder.args().len();
        let active_before = builder.active_streams().len();
        builder.register_inputs(second.clone()).unwrap();

        prop_assert_eq!(builder.args().len(), args_before + 2 * second.len());
        prop_assert_eq!(builder.active_streams().len(), active_before + second.len());

        let expected: Vec<StreamLabel> = (0..first.len() + second.len()).map(StreamLabel::Input).collect();
        prop_assert_eq!(builder.active_streams(), expected.as_slice());

        for (i, path) in second.iter().enumerate() {
            prop_assert_eq!(&builder.args()[args_before + 2 * i], "-i");
            prop_assert_eq!(&builder.args()[args_before + 2 * i + 1], path);
        }
    }

    /// Resize keeps cardinality and order, consuming each input once.
    #[test]
    fn prop_resize_preserves_cardinality(
        n in 0usize..8,
        width in 1u32..4096,
        height in 1u32..4096,
    ) {
        let state = GraphState::new().with_inputs(n);
        let next = apply_stage(&state, &StageSpec::Resize { width, height }).unwrap();

        prop_assert_eq!(next.active.len(), n);
        prop_assert_eq!(next.chains.len(), n);
        for (i, chain) in next.chains.iter().enumerate() {
            prop_assert_eq!(&chain.inputs, &vec![StreamLabel::Input(i)]);
            prop_assert_eq!(&chain.outputs, &vec![StreamLabel::Resized(i)]);
            prop_assert_eq!(next.active[i], StreamLabel::Resized(i));
        }
    }

    /// A zero width or height is refused and the state is kept.
    #[test]
    fn prop_zero_dimension_refused(
        n in 0usize..8,
        (width, height) in prop_oneof![
            (Just(0u32), 0u32..4096),
            (1u32..4096, Just(0u32)),
        ],
    ) {
        let state = GraphState::new().with_inputs(n);
        let result = apply_stage(&state, &StageSpec::Resize { width, height });
        prop_assert_eq!(result, Err(GraphError::InvalidDimensions { width, height }));
        prop_assert!(state.chains.is_empty());
    }

    /// Concat reduces two or more streams to one and refuses fewer.
    #[test]
    fn prop_concat_cardinality(n in 0usize..8, resize_first in any::<bool>()) {
        let mut state = GraphState::new().with_inputs(n);
        if resize_first {
            state = apply_stage(&state, &StageSpec::Resize { width: 640, height: 480 }).unwrap();
        }

        match apply_stage(&state, &StageSpec::Concat) {
            Ok(next) => {
                prop_assert!(n >= 2);
                prop_assert_eq!(next.active, vec![StreamLabel::Concatenated]);
                prop_assert_eq!(next.chains.len(), state.chains.len() + 1);
                prop_assert_eq!(&next.chains.last().unwrap().inputs, &state.active);
            }
            Err(err) => {
                prop_assert!(n < 2);
                prop_assert_eq!(err, GraphError::InsufficientStreams { found: n });
            }
        }
    }

    /// Output mapping emits one group per active stream.
    #[test]
    fn prop_mapping_one_group_per_stream(paths in arb_paths(6), resize in any::<bool>()) {
        let mut builder = CommandBuilder::new(&EncodingOptions::default()).unwrap();
        builder.register_inputs(paths.clone()).unwrap();
        if resize {
            builder.apply_resize_filter(320, 240).unwrap();
        }
        builder.finalize_filter_graph().unwrap();

        let before = builder.args().len();
        let active = builder.active_streams().to_vec();
        builder.finalize_output_mapping().unwrap();

        let params = builder.profile().output_params();
        let group_len = params.len() + 3;
        let appended = &builder.args()[before..];
        prop_assert_eq!(appended.len(), active.len() * group_len);

        for (group, label) in appended.chunks(group_len).zip(&active) {
            prop_assert_eq!(&group[..params.len()], params.as_slice());
            prop_assert_eq!(&group[params.len()], "-map");
            prop_assert_eq!(&group[params.len() + 1], &label.to_string());
            prop_assert_eq!(&group[params.len() + 2], &label.output_filename());
        }
    }
}
