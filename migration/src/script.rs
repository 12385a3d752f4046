use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// 一个待应用的迁移脚本（只保存名称，SQL 内容由 [`ScriptSource`] 加载）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    name: String,
}

impl MigrationScript {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// 文件名，例如 `001_init_schema.sql`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 版本号：去掉扩展名后的文件名，例如 `001_init_schema`
    pub fn version(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[..idx],
            _ => &self.name,
        }
    }
}

/// 迁移脚本加载器
pub trait ScriptSource: Send + Sync {
    fn load(&self, script: &MigrationScript) -> io::Result<String>;
}

/// 从目录读取 `<dir>/<name>`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ScriptSource for DirectorySource {
    fn load(&self, script: &MigrationScript) -> io::Result<String> {
        fs::read_to_string(self.dir.join(script.name()))
    }
}

/// 内存中的脚本表，用于内嵌脚本和测试
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    bodies: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(name.into(), body.into());
        self
    }
}

impl ScriptSource for StaticSource {
    fn load(&self, script: &MigrationScript) -> io::Result<String> {
        self.bodies.get(script.name()).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("migration script not found: {}", script.name()),
            )
        })
    }
}
