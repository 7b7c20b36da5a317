use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{io_err, Result};

/// 文件内容的 SHA-256 摘要
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{:02x}", byte)).collect()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

/// 对任意字节流计算哈希
pub fn hash_stream<R: Read>(mut stream: R) -> std::io::Result<ContentHash> {
    let mut hasher = Sha256::new();
    std::io::copy(&mut stream, &mut hasher)?;
    Ok(ContentHash(hasher.finalize().into()))
}

/// 对文件原始字节计算哈希
pub fn hash_file(path: &Path) -> Result<ContentHash> {
    let file = File::open(path).map_err(io_err(path))?;
    hash_stream(file).map_err(io_err(path))
}
