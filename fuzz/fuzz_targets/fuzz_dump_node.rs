#![no_main]

use apfs_dump::domain::entities::Block;
use apfs_dump::domain::repositories::NodeDumper;
use apfs_dump::infrastructure::apfs::ApfsNodeDumper;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let block = Block::from_bytes(data);

    let mut dumper = ApfsNodeDumper::new();
    dumper.set_text(true);
    let _ = dumper.dump_node(&mut std::io::sink(), &block, 0);
    let _ = dumper.dump_raw(&mut std::io::sink(), &block, 0);
});
