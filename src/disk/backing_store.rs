use std::io::Result;

/// 字节寻址的后备存储（虚拟磁盘）。
///
/// 文件系统的每一步都直接落到这里：没有写缓冲，也没有读缓存，
/// 每次读取都反映存储当前的真实内容。
pub trait BackingStore: Send + Sync {
    /// 从 `offset` 处读满 `buf`，越过末尾视为错误
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// 在 `offset` 处写入 `buf`，超过当前长度时自动扩展
    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<()>;

    /// 把存储截断（或扩展）到 `len` 字节
    fn truncate(&self, len: u64) -> Result<()>;

    fn read_byte(&self, offset: u64) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_at(offset, &mut buf)?;
        Ok(buf[0])
    }

    fn write_byte(&self, offset: u64, value: u8) -> Result<()> {
        self.write_at(offset, &[value])
    }
}
