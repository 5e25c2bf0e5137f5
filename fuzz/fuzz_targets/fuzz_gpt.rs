#![no_main]

use apfs_dump::domain::repositories::PartitionMap;
use apfs_dump::infrastructure::block_device::MemoryBlockDevice;
use apfs_dump::infrastructure::partition::GptPartitionMap;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut device = MemoryBlockDevice::new(data.to_vec());
    let mut map = GptPartitionMap::new();
    if map.load_and_verify(&mut device) {
        if let Some(index) = map.find_first_filesystem_partition() {
            let _ = map.partition_offset_and_size(index);
        }
    }
});
