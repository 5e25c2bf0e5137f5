//! Report passes over synthetic images

mod common;

use apfs_dump::application::dto::{DumpOptions, ScanStats};
use apfs_dump::application::{
    resolve_bounds, MapBlocksUseCase, ScanBlocksUseCase, EMPTY_ROW, MAP_HEADER, MAP_SEPARATOR,
};
use apfs_dump::domain::entities::{Block, PartitionBounds};
use apfs_dump::domain::repositories::{BlockDevice, DeviceError};
use apfs_dump::domain::services::CancellationToken;
use apfs_dump::infrastructure::apfs::{ApfsBlockVerifier, ApfsNodeDumper};
use apfs_dump::infrastructure::block_device::MemoryBlockDevice;
use apfs_dump::infrastructure::partition::GptPartitionMap;
use common::*;
use proptest::prelude::*;
use rstest::*;

// ============================================================================
// Helpers
// ============================================================================

fn map_report<D: BlockDevice + ?Sized>(
    device: &mut D,
    bounds: PartitionBounds,
    cancel: &CancellationToken,
) -> (String, ScanStats) {
    let verifier = ApfsBlockVerifier::new();
    let labeler = ApfsNodeDumper::new();
    let mut out = Vec::new();
    let stats = MapBlocksUseCase::new(&verifier, &labeler)
        .execute(device, bounds, &mut out, cancel)
        .unwrap();
    (String::from_utf8(out).unwrap(), stats)
}

fn dump_report<D: BlockDevice + ?Sized>(
    device: &mut D,
    bounds: PartitionBounds,
    options: DumpOptions,
    cancel: &CancellationToken,
) -> (String, ScanStats) {
    let verifier = ApfsBlockVerifier::new();
    let mut out = Vec::new();
    let stats = ScanBlocksUseCase::new(&verifier, ApfsNodeDumper::new(), options)
        .execute(device, bounds, &mut out, cancel)
        .unwrap();
    (String::from_utf8(out).unwrap(), stats)
}

fn whole(device: &MemoryBlockDevice) -> PartitionBounds {
    PartitionBounds::whole_device(device.size())
}

/// Cancels the token once a given block has been read
struct InterruptingDevice {
    inner: MemoryBlockDevice,
    interrupt_after: u64,
    token: CancellationToken,
}

impl BlockDevice for InterruptingDevice {
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<(), DeviceError> {
        self.inner.read_at(offset, buffer)?;
        if offset / 4096 == self.interrupt_after {
            self.token.cancel();
        }
        Ok(())
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }
}

/// Fails every read at or past `fail_at`
struct FailingDevice {
    inner: MemoryBlockDevice,
    fail_at: u64,
}

impl BlockDevice for FailingDevice {
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<(), DeviceError> {
        if offset / 4096 >= self.fail_at {
            return Err(DeviceError::Other("media error".into()));
        }
        self.inner.read_at(offset, buffer)
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

#[fixture]
fn example() -> MemoryBlockDevice {
    worked_example()
}

// ============================================================================
// Worked example
// ============================================================================

#[rstest]
fn test_worked_example_map(mut example: MemoryBlockDevice) {
    let bounds = whole(&example);
    assert_eq!(bounds, PartitionBounds::new(0, 4096));

    let (map, stats) = map_report(&mut example, bounds, &CancellationToken::new());
    let lines: Vec<&str> = map.lines().collect();

    assert_eq!(lines[0], MAP_HEADER);
    assert_eq!(lines[1], MAP_SEPARATOR);
    assert_eq!(lines[2], EMPTY_ROW);
    assert_eq!(
        lines[3],
        "00000005 | 00000404 | 0000001F | 40000002 | 0000000E | 0003 | 0000 | 00000003 | B-Tree Root (File System Tree) [Root]"
    );
    assert_eq!(lines[4], EMPTY_ROW);
    assert!(lines[5].starts_with("00000009 |"));
    assert!(lines[5].ends_with("| Data"));
    assert_eq!(lines[6], EMPTY_ROW);
    assert_eq!(lines[7], "");
    assert_eq!(lines.len(), 8);

    assert_eq!(stats.blocks_visited, 4096);
    assert_eq!(stats.valid_blocks, 1);
    assert_eq!(stats.invalid_blocks, 1);
    assert_eq!(stats.empty_blocks, 4094);
    assert!(!stats.cancelled);
}

#[rstest]
fn test_worked_example_dump(mut example: MemoryBlockDevice) {
    let bounds = whole(&example);
    let (dump, stats) = dump_report(
        &mut example,
        bounds,
        DumpOptions::default(),
        &CancellationToken::new(),
    );

    assert_eq!(dump_entries(&dump), 1);
    assert!(dump.starts_with("[Block 0000000000000005] B-Tree Root (File System Tree)\n"));
    assert!(!dump.contains("0000000000000009"));
    assert_eq!(stats.entries_written, 1);
}

#[rstest]
fn test_raw_invalid_adds_data_block(mut example: MemoryBlockDevice) {
    let bounds = whole(&example);
    let (dump, stats) = dump_report(
        &mut example,
        bounds,
        DumpOptions::new().with_raw_invalid(true),
        &CancellationToken::new(),
    );

    assert_eq!(dump_entries(&dump), 1);
    assert!(dump.lines().any(|l| l == "0000000000000009"));
    assert_eq!(stats.entries_written, 2);
}

// ============================================================================
// Empty-run compaction
// ============================================================================

#[rstest]
#[case::single_block(1)]
#[case::thousand_blocks(1000)]
fn test_empty_run_gives_one_row(#[case] run: u64) {
    // a used block on each side of the run
    let mut device = image(run + 2, &[(0, garbage(1)), (run + 1, garbage(2))]);
    let bounds = whole(&device);
    let (map, _) = map_report(&mut device, bounds, &CancellationToken::new());

    assert_eq!(empty_rows(&map), 1);
    assert_eq!(data_rows(&map).len(), 2);
}

#[test]
fn test_separated_empty_runs_give_two_rows() {
    let mut device = image(7, &[(0, garbage(1)), (3, garbage(2)), (6, garbage(3))]);
    let bounds = whole(&device);
    let (map, _) = map_report(&mut device, bounds, &CancellationToken::new());

    assert_eq!(empty_rows(&map), 2);
}

#[test]
fn test_all_empty_range_gives_single_row() {
    let mut device = image(64, &[]);
    let bounds = whole(&device);
    let (map, stats) = map_report(&mut device, bounds, &CancellationToken::new());

    assert_eq!(empty_rows(&map), 1);
    assert_eq!(stats.empty_blocks, 64);
}

#[test]
fn test_empty_range_writes_header_only() {
    let mut device = image(4, &[]);
    let (map, stats) = map_report(
        &mut device,
        PartitionBounds::new(0, 0),
        &CancellationToken::new(),
    );
    assert_eq!(map, format!("{MAP_HEADER}\n{MAP_SEPARATOR}\n\n"));
    assert_eq!(stats.blocks_visited, 0);
}

// ============================================================================
// Dump and map agree
// ============================================================================

#[test]
fn test_dump_matches_map_node_rows() {
    let mut device = image(
        40,
        &[
            (2, object(0x1, 0x10, 0x8000_0000 | OBJECT_TYPE_NX_SUPERBLOCK, 0)),
            (3, btree_node(0x400, 0x10, true, 1, 2)),
            (4, btree_node(0x401, 0x10, false, 0, 9)),
            (11, garbage(5)),
            (20, object(0x402, 0x11, OBJ_PHYSICAL | OBJECT_TYPE_OMAP, 0)),
            (39, garbage(6)),
        ],
    );
    let bounds = whole(&device);
    let cancel = CancellationToken::new();
    let (map, _) = map_report(&mut device, bounds, &cancel);
    let (dump, _) = dump_report(&mut device, bounds, DumpOptions::default(), &cancel);

    // map rows carry 8 hex digits, dump titles 16
    let mapped: Vec<&str> = node_rows(&map).into_iter().map(|row| &row[..8]).collect();
    let dumped: Vec<&str> = dump
        .lines()
        .filter_map(|l| l.strip_prefix("[Block "))
        .map(|l| &l[8..16])
        .collect();

    assert_eq!(mapped, dumped);
    assert_eq!(mapped.len(), 4);
    assert_eq!(data_rows(&map).len(), 2);
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_cancellation_truncates_map() {
    let token = CancellationToken::new();
    let inner = image(100, &[(10, garbage(1)), (50, garbage(2)), (80, garbage(3))]);
    let mut device = InterruptingDevice {
        inner,
        interrupt_after: 60,
        token: token.clone(),
    };
    let (map, stats) = map_report(&mut device, PartitionBounds::new(0, 100), &token);

    assert!(stats.cancelled);
    assert_eq!(stats.blocks_visited, 61);
    let data = data_rows(&map);
    assert_eq!(data.len(), 2);
    assert!(data[1].starts_with("00000032"));
    assert!(map.ends_with("\n\n"));
}

#[test]
fn test_cancelled_dump_is_a_prefix() {
    let token = CancellationToken::new();
    let inner = image(
        30,
        &[
            (5, btree_node(0x400, 1, true, 0, 0)),
            (25, btree_node(0x401, 1, false, 0, 0)),
        ],
    );
    let mut device = InterruptingDevice {
        inner,
        interrupt_after: 10,
        token: token.clone(),
    };
    let (dump, stats) = dump_report(
        &mut device,
        PartitionBounds::new(0, 30),
        DumpOptions::default(),
        &token,
    );

    assert!(stats.cancelled);
    assert_eq!(dump_entries(&dump), 1);
    assert!(dump.starts_with("[Block 0000000000000005]"));
}

// ============================================================================
// Read failures
// ============================================================================

#[test]
fn test_read_failure_is_fatal() {
    let mut device = FailingDevice {
        inner: image(16, &[]),
        fail_at: 8,
    };
    let verifier = ApfsBlockVerifier::new();
    let labeler = ApfsNodeDumper::new();
    let mut out = Vec::new();
    let err = MapBlocksUseCase::new(&verifier, &labeler)
        .execute(
            &mut device,
            PartitionBounds::new(0, 16),
            &mut out,
            &CancellationToken::new(),
        )
        .unwrap_err();
    assert!(err.to_string().contains("block 0x8"));
}

// ============================================================================
// Partition resolution
// ============================================================================

#[test]
fn test_bounds_follow_gpt_partition() {
    // partition covers 512-byte LBAs 80..=399, blocks 10..50
    let mut device = image(64, &[(12, btree_node(0x400, 1, true, 0, 0)), (60, garbage(9))]);
    add_gpt(&mut device, 80, 399);

    let bounds = resolve_bounds(&mut device, &mut GptPartitionMap::new());
    assert_eq!(bounds, PartitionBounds::new(10, 40));

    let (map, _) = map_report(&mut device, bounds, &CancellationToken::new());
    let rows = node_rows(&map);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].starts_with("0000000C |"));
    assert!(data_rows(&map).is_empty());
}

#[test]
fn test_bounds_fall_back_without_table() {
    let mut device = image(32, &[(1, garbage(1))]);
    let bounds = resolve_bounds(&mut device, &mut GptPartitionMap::new());
    assert_eq!(bounds, PartitionBounds::new(0, 32));
}

#[test]
fn test_bounds_fall_back_on_corrupt_table() {
    let mut device = image(64, &[]);
    add_gpt(&mut device, 80, 399);
    // flip a byte inside the partition array
    device.write_at(1024 + 40, &[0xFF]);
    let bounds = resolve_bounds(&mut device, &mut GptPartitionMap::new());
    assert_eq!(bounds, PartitionBounds::new(0, 64));
}

#[test]
fn test_reading_a_block_round_trips() {
    let bytes = btree_node(0x400, 3, true, 0, 0);
    let mut device = image(4, &[(2, bytes.clone())]);
    let mut block = Block::new();
    device.read_block(2, &mut block).unwrap();
    assert_eq!(block.as_bytes(), &bytes[..]);
}

// ============================================================================
// Properties
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Kind {
    Empty,
    Node,
    Data,
}

fn kind() -> impl Strategy<Value = Kind> {
    prop_oneof![
        3 => Just(Kind::Empty),
        1 => Just(Kind::Node),
        1 => Just(Kind::Data),
    ]
}

fn build(kinds: &[Kind]) -> MemoryBlockDevice {
    let placed: Vec<(u64, Vec<u8>)> = kinds
        .iter()
        .enumerate()
        .filter_map(|(i, k)| match k {
            Kind::Empty => None,
            Kind::Node => Some((i as u64, btree_node(0x400 + i as u64, 1, i % 2 == 0, 0, 0))),
            Kind::Data => Some((i as u64, garbage(i as u8))),
        })
        .collect();
    image(kinds.len() as u64, &placed)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_reports_are_deterministic(kinds in prop::collection::vec(kind(), 1..48)) {
        let mut device = build(&kinds);
        let bounds = whole(&device);
        let cancel = CancellationToken::new();

        let (first, _) = map_report(&mut device, bounds, &cancel);
        let (second, _) = map_report(&mut device, bounds, &cancel);
        prop_assert_eq!(first, second);

        let (first, _) = dump_report(&mut device, bounds, DumpOptions::default(), &cancel);
        let (second, _) = dump_report(&mut device, bounds, DumpOptions::default(), &cancel);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_one_row_per_empty_run(kinds in prop::collection::vec(kind(), 1..48)) {
        let mut device = build(&kinds);
        let bounds = whole(&device);
        let (map, stats) = map_report(&mut device, bounds, &CancellationToken::new());

        let runs = kinds
            .iter()
            .enumerate()
            .filter(|(i, k)| {
                matches!(k, Kind::Empty) && (*i == 0 || !matches!(kinds[i - 1], Kind::Empty))
            })
            .count();
        let nodes = kinds.iter().filter(|k| matches!(k, Kind::Node)).count();
        let data = kinds.iter().filter(|k| matches!(k, Kind::Data)).count();

        prop_assert_eq!(empty_rows(&map), runs);
        prop_assert_eq!(node_rows(&map).len(), nodes);
        prop_assert_eq!(data_rows(&map).len(), data);
        prop_assert_eq!(stats.blocks_visited as usize, kinds.len());
    }

    #[test]
    fn prop_dump_has_one_entry_per_node(kinds in prop::collection::vec(kind(), 1..48)) {
        let mut device = build(&kinds);
        let bounds = whole(&device);
        let (dump, _) = dump_report(&mut device, bounds, DumpOptions::default(), &CancellationToken::new());
        let nodes = kinds.iter().filter(|k| matches!(k, Kind::Node)).count();
        prop_assert_eq!(dump_entries(&dump), nodes);
    }
}
