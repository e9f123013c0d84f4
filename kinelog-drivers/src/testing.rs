//! Host stand-ins for the logger's buses: a register-file I2C device and a
//! RAM-backed SD card

use std::cell::RefCell;

use embedded_hal::delay::DelayNs;
use embedded_sdmmc::{Block, BlockCount, BlockDevice, BlockIdx};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

/// I2C device modelled as 256 byte registers with an auto-incrementing
/// register pointer, the way both the MPU6050 and DS1307 behave
pub struct RegisterBus {
    pub address: u8,
    pub regs: [u8; 256],
    pub present: bool,
    /// Every register write as (register, value), in order
    pub writes: Vec<(u8, u8)>,
}

impl RegisterBus {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            regs: [0; 256],
            present: true,
            writes: Vec::new(),
        }
    }

    /// Last value written to `reg`
    pub fn last_write(&self, reg: u8) -> Option<u8> {
        self.writes
            .iter()
            .rev()
            .find(|(r, _)| *r == reg)
            .map(|(_, v)| *v)
    }
}

impl ErrorType for RegisterBus {
    type Error = ErrorKind;
}

impl I2c for RegisterBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !self.present || address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        let mut pointer: Option<u8> = None;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let Some((&reg, data)) = bytes.split_first() else {
                        continue;
                    };
                    let mut p = reg;
                    for &value in data {
                        self.regs[p as usize] = value;
                        self.writes.push((p, value));
                        p = p.wrapping_add(1);
                    }
                    pointer = Some(p);
                }
                Operation::Read(buf) => {
                    let mut p = pointer.unwrap_or(0);
                    for byte in buf.iter_mut() {
                        *byte = self.regs[p as usize];
                        p = p.wrapping_add(1);
                    }
                    pointer = Some(p);
                }
            }
        }
        Ok(())
    }
}

/// Blocking delay that only accumulates the requested time
#[derive(Default)]
pub struct NoopDelay {
    pub total_ns: u64,
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// Access past the end of a [`RamDisk`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange;

/// SD card held in memory, formatted as one FAT16 partition
pub struct RamDisk {
    blocks: RefCell<Vec<[u8; Block::LEN]>>,
}

impl RamDisk {
    /// Partition start, after the MBR
    const PARTITION_LBA: u32 = 1;
    const RESERVED_BLOCKS: u16 = 1;
    const FATS: u8 = 2;
    const ROOT_ENTRIES: u16 = 512;
    /// One block per cluster; FAT16 needs at least 4085 clusters
    const CLUSTERS: u32 = 4200;

    /// Freshly formatted card with an empty root directory
    pub fn fat16() -> Self {
        let fat_blocks = ((Self::CLUSTERS + 2) * 2).div_ceil(Block::LEN_U32);
        let root_blocks = u32::from(Self::ROOT_ENTRIES) * 32 / Block::LEN_U32;
        let volume_blocks = u32::from(Self::RESERVED_BLOCKS)
            + u32::from(Self::FATS) * fat_blocks
            + root_blocks
            + Self::CLUSTERS;
        let total = Self::PARTITION_LBA + volume_blocks;
        let mut blocks = vec![[0u8; Block::LEN]; total as usize];

        // MBR with a single FAT16 (LBA) partition
        let mbr = &mut blocks[0];
        let entry = &mut mbr[446..462];
        entry[4] = 0x0E;
        entry[8..12].copy_from_slice(&Self::PARTITION_LBA.to_le_bytes());
        entry[12..16].copy_from_slice(&volume_blocks.to_le_bytes());
        mbr[510..512].copy_from_slice(&[0x55, 0xAA]);

        // Boot sector
        let boot = &mut blocks[Self::PARTITION_LBA as usize];
        boot[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        boot[3..11].copy_from_slice(b"KINELOG ");
        boot[11..13].copy_from_slice(&(Block::LEN as u16).to_le_bytes());
        boot[13] = 1;
        boot[14..16].copy_from_slice(&Self::RESERVED_BLOCKS.to_le_bytes());
        boot[16] = Self::FATS;
        boot[17..19].copy_from_slice(&Self::ROOT_ENTRIES.to_le_bytes());
        boot[21] = 0xF8;
        boot[22..24].copy_from_slice(&(fat_blocks as u16).to_le_bytes());
        boot[32..36].copy_from_slice(&volume_blocks.to_le_bytes());
        boot[38] = 0x29;
        boot[43..54].copy_from_slice(b"KINELOG    ");
        boot[54..62].copy_from_slice(b"FAT16   ");
        boot[510..512].copy_from_slice(&[0x55, 0xAA]);

        // Media descriptor and end-of-chain marker in clusters 0 and 1
        for fat in 0..u32::from(Self::FATS) {
            let lba = Self::PARTITION_LBA + u32::from(Self::RESERVED_BLOCKS) + fat * fat_blocks;
            blocks[lba as usize][0..4].copy_from_slice(&[0xF8, 0xFF, 0xFF, 0xFF]);
        }

        Self {
            blocks: RefCell::new(blocks),
        }
    }
}

impl BlockDevice for RamDisk {
    type Error = OutOfRange;

    fn read(&self, blocks: &mut [Block], start_block_idx: BlockIdx) -> Result<(), OutOfRange> {
        let disk = self.blocks.borrow();
        for (i, block) in blocks.iter_mut().enumerate() {
            let stored = disk
                .get(start_block_idx.0 as usize + i)
                .ok_or(OutOfRange)?;
            block.contents.copy_from_slice(stored);
        }
        Ok(())
    }

    fn write(&self, blocks: &[Block], start_block_idx: BlockIdx) -> Result<(), OutOfRange> {
        let mut disk = self.blocks.borrow_mut();
        for (i, block) in blocks.iter().enumerate() {
            let stored = disk
                .get_mut(start_block_idx.0 as usize + i)
                .ok_or(OutOfRange)?;
            stored.copy_from_slice(&block.contents);
        }
        Ok(())
    }

    fn num_blocks(&self) -> Result<BlockCount, OutOfRange> {
        Ok(BlockCount(self.blocks.borrow().len() as u32))
    }
}
