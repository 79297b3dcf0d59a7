use std::{
    io::{Error, ErrorKind, Result},
    sync::{Mutex, PoisonError},
};

use crate::disk::backing_store::BackingStore;

/// 内存中的虚拟磁盘，主要给测试和嵌入场景使用
#[derive(Debug, Default)]
pub struct MemDisk {
    bytes: Mutex<Vec<u8>>,
}

impl MemDisk {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用已有镜像内容构造
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(bytes),
        }
    }

    /// 当前镜像内容的拷贝
    pub fn snapshot(&self) -> Vec<u8> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl BackingStore for MemDisk {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        let start = offset as usize;
        let end = start + buf.len();
        if end > bytes.len() {
            return Err(Error::new(
                ErrorKind::UnexpectedEof,
                format!("read of {}..{} past end of {}-byte disk", start, end, bytes.len()),
            ));
        }
        buf.copy_from_slice(&bytes[start..end]);
        Ok(())
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> Result<()> {
        let mut bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        let start = offset as usize;
        let end = start + buf.len();
        if end > bytes.len() {
            bytes.resize(end, 0);
        }
        bytes[start..end].copy_from_slice(buf);
        Ok(())
    }

    fn truncate(&self, len: u64) -> Result<()> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resize(len as usize, 0);
        Ok(())
    }
}
