//! 依赖注入集成测试共用的夹具

use parking_lot::Mutex;

/// 按发生顺序记录事件
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Mutex<Vec<String>>,
}

impl EventLog {
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries.lock().iter().filter(|e| e.as_str() == entry).count()
    }
}
