/// 超级块：block_size / num_blocks / num_inodes 各占 1 字节
pub const SUPER_BLOCK_SIZE: u64 = 3;

// 位图紧跟在超级块之后
pub const BITMAP_OFFSET: u64 = SUPER_BLOCK_SIZE;

// 名字字段定长 10 字节，不足补 0，超出静默截断
pub const NAME_LEN: usize = 10;

// 每个 inode 的块指针数（直接 / 一级间接 / 二级间接各 3 个）
pub const DIRECT_PTRS: usize = 3;
pub const INDIRECT_PTRS: usize = 3;
pub const DOUBLE_INDIRECT_PTRS: usize = 3;

/// used(1) + is_dir(1) + name(10) + size(1) + 3 * 3 个块指针
pub const INODE_RECORD_SIZE: u64 =
    (2 + NAME_LEN + 1 + DIRECT_PTRS + INDIRECT_PTRS + DOUBLE_INDIRECT_PTRS) as u64;

/// inode 表之后的根索引占位字节
pub const ROOT_INDEX_SIZE: u64 = 1;

// 根目录固定在 0 号槽位
pub const ROOT_INODE: usize = 0;
pub const ROOT_NAME: &str = "/";

/// size 字段只有 1 字节，文件长度和目录项数都不能超过它
pub const MAX_SIZE_FIELD: usize = u8::MAX as usize;
