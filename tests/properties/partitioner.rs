//! Property tests for change-set partitioning.

use proptest::prelude::*;

use fleek_iterative_deploy::domain::entities::{FileChunk, SizedFile};
use fleek_iterative_deploy::domain::services::partition;
use fleek_iterative_deploy::domain::value_objects::PartitionPolicy;

fn sized_files() -> impl Strategy<Value = Vec<SizedFile>> {
    proptest::collection::vec(0u64..5_000, 0..64).prop_map(|sizes| {
        sizes
            .into_iter()
            .enumerate()
            .map(|(i, bytes)| SizedFile::new(format!("build/f{i}.html"), bytes))
            .collect()
    })
}

fn policy() -> impl Strategy<Value = PartitionPolicy> {
    prop_oneof![
        (1usize..20).prop_map(PartitionPolicy::MaxItems),
        (1u64..10_000).prop_map(PartitionPolicy::MaxBytes),
        (1u64..2_000, 1u64..20).prop_map(|(min_chunk_bytes, max_units)| {
            PartitionPolicy::ChunkUnits {
                min_chunk_bytes,
                max_units,
            }
        }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Concatenating the chunks gives back the input in order.
    #[test]
    fn property_chunks_preserve_every_file_in_order(
        files in sized_files(),
        policy in policy(),
    ) {
        let chunks = partition(&files, &policy);

        let flattened: Vec<_> = chunks
            .into_iter()
            .flat_map(FileChunk::into_files)
            .collect();
        let expected: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        prop_assert_eq!(flattened, expected);
    }

    /// PROPERTY: A chunk only exceeds the budget when it holds a single file.
    #[test]
    fn property_chunks_respect_budget(
        files in sized_files(),
        policy in policy(),
    ) {
        for chunk in partition(&files, &policy) {
            prop_assert!(!chunk.is_empty());
            prop_assert!(
                chunk.weight() <= policy.budget() || chunk.len() == 1,
                "chunk of {} files weighs {} over budget {}",
                chunk.len(),
                chunk.weight(),
                policy.budget()
            );
        }
    }

    /// PROPERTY: Chunks are greedy; the next chunk's first file did not fit.
    #[test]
    fn property_chunks_are_greedy(
        files in sized_files(),
        policy in policy(),
    ) {
        let chunks = partition(&files, &policy);
        let mut offset = 0;
        for pair in chunks.windows(2) {
            offset += pair[0].len();
            let next = &files[offset];
            prop_assert!(pair[0].weight() + policy.weight_of(next.bytes) > policy.budget());
        }
    }
}
