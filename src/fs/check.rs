use std::fmt;

use crate::{
    disk::BackingStore,
    fs::{
        config::ROOT_INODE,
        data_area::DataArea,
        directory::Directory,
        error::Result,
        inode_table::InodeTable,
        layout::Layout,
    },
};

/// 一致性检查发现的问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    RootMissing,
    // 位图置位但没有 inode 引用
    LeakedBlock(usize),
    // 被引用但位图没置位
    UnmarkedBlock { block: usize, owner: usize },
    SharedBlock { block: usize, owners: Vec<usize> },
    BadBlockPointer { slot: usize, block: usize },
    DanglingChild { dir: usize, child: usize },
    OversizedFile { slot: usize, size: usize },
    // 已用但从根目录走不到
    UnreachableInode(usize),
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootMissing => write!(f, "root slot is not a used directory"),
            Self::LeakedBlock(block) => {
                write!(f, "block {} is marked used but owned by no inode", block)
            }
            Self::UnmarkedBlock { block, owner } => {
                write!(f, "block {} owned by inode {} is marked free", block, owner)
            }
            Self::SharedBlock { block, owners } => {
                write!(f, "block {} is owned by several inodes {:?}", block, owners)
            }
            Self::BadBlockPointer { slot, block } => {
                write!(f, "inode {} points at nonexistent block {}", slot, block)
            }
            Self::DanglingChild { dir, child } => {
                write!(f, "directory {} lists unused inode {}", dir, child)
            }
            Self::OversizedFile { slot, size } => {
                write!(f, "inode {} size {} needs more than 3 blocks", slot, size)
            }
            Self::UnreachableInode(slot) => {
                write!(f, "inode {} is in use but not reachable from the root", slot)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub problems: Vec<Inconsistency>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// 只读检查：位图 <-> 直接块引用，目录子项 <-> 已用 inode，以及从根出发的可达性。不做修复。
pub fn check<D: BackingStore>(disk: &D, layout: Layout) -> Result<CheckReport> {
    let table = InodeTable::new(disk, layout);
    let data = DataArea::new(disk, layout);
    let directory = Directory::new(disk, layout);
    let block_size = layout.block_size();
    let mut problems = Vec::new();

    let root = table.read_slot(ROOT_INODE)?;
    if !root.is_used() || !root.is_dir() {
        problems.push(Inconsistency::RootMissing);
    }

    let used = table.used()?;
    let mut owners: Vec<Vec<usize>> = vec![Vec::new(); layout.num_blocks()];

    for (slot, inode) in &used {
        if inode.size as usize > layout.max_file_size() {
            problems.push(Inconsistency::OversizedFile {
                slot: *slot,
                size: inode.size as usize,
            });
            continue;
        }
        for &block in inode.blocks(block_size) {
            match owners.get_mut(block as usize) {
                Some(list) => list.push(*slot),
                None => problems.push(Inconsistency::BadBlockPointer {
                    slot: *slot,
                    block: block as usize,
                }),
            }
        }
    }

    for (block, list) in owners.iter().enumerate() {
        let marked = data.bitmap().is_used(block)?;
        match (marked, list.len()) {
            (true, 0) => problems.push(Inconsistency::LeakedBlock(block)),
            (false, n) if n > 0 => problems.push(Inconsistency::UnmarkedBlock {
                block,
                owner: list[0],
            }),
            (_, n) if n > 1 => problems.push(Inconsistency::SharedBlock {
                block,
                owners: list.clone(),
            }),
            _ => {}
        }
    }

    let mut listings: Vec<Vec<usize>> = vec![Vec::new(); layout.num_inodes()];
    for (slot, inode) in &used {
        if !inode.is_dir() || inode.size as usize > layout.max_children() {
            continue;
        }
        let readable = inode
            .blocks(block_size)
            .iter()
            .all(|&block| (block as usize) < layout.num_blocks());
        if !readable {
            continue;
        }
        for child in directory.children(*slot)? {
            let listed = child < layout.num_inodes() && table.read_slot(child)?.is_used();
            if listed {
                listings[*slot].push(child);
            } else {
                problems.push(Inconsistency::DanglingChild { dir: *slot, child });
            }
        }
    }

    let mut reached = vec![false; layout.num_inodes()];
    let mut pending = vec![ROOT_INODE];
    reached[ROOT_INODE] = true;
    while let Some(dir) = pending.pop() {
        for &child in &listings[dir] {
            if !reached[child] {
                reached[child] = true;
                pending.push(child);
            }
        }
    }
    for (slot, _) in &used {
        if !reached[*slot] {
            problems.push(Inconsistency::UnreachableInode(*slot));
        }
    }

    for problem in &problems {
        log::warn!("check: {}", problem);
    }

    Ok(CheckReport { problems })
}
