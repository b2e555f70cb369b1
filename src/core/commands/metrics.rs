use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{Command, CommandError};
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuTimes {
    pub busy: u64,
    pub idle: u64,
}

impl CpuTimes {
    pub fn total(&self) -> u64 {
        self.busy + self.idle
    }
    pub fn percent_since(&self, earlier: &CpuTimes) -> f64 {
        let total = self.total().saturating_sub(earlier.total());
        if total == 0 {
            return 0.0;
        }
        let busy = self.busy.saturating_sub(earlier.busy);
        busy as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryInfo {
    pub total_kb: u64,
    pub available_kb: u64,
}

impl MemoryInfo {
    pub fn used_percent(&self) -> f64 {
        if self.total_kb == 0 {
            return 0.0;
        }
        let used = self.total_kb.saturating_sub(self.available_kb);
        used as f64 / self.total_kb as f64 * 100.0
    }
}

pub trait MetricsSource: Send + Sync {
    fn cpu_times(&self) -> io::Result<CpuTimes>;
    fn memory(&self) -> io::Result<MemoryInfo>;
}
#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcFs {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MetricsSource for ProcFs {
    fn cpu_times(&self) -> io::Result<CpuTimes> {
        let stat = fs::read_to_string(self.root.join("stat"))?;
        parse_stat(&stat)
    }

    fn memory(&self) -> io::Result<MemoryInfo> {
        let meminfo = fs::read_to_string(self.root.join("meminfo"))?;
        parse_meminfo(&meminfo)
    }
}

fn invalid(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

// cpu  user nice system idle iowait irq softirq steal guest guest_nice
fn parse_stat(stat: &str) -> io::Result<CpuTimes> {
    let line = stat
        .lines()
        .find(|line| line.starts_with("cpu "))
        .ok_or_else(|| invalid("no aggregate cpu line in stat"))?;

    let fields = line
        .split_whitespace()
        .skip(1)
        .map(str::parse::<u64>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid("malformed cpu line in stat"))?;

    if fields.len() < 4 {
        return Err(invalid("short cpu line in stat"));
    }

    let field = |i: usize| fields.get(i).copied().unwrap_or(0);
    // guest time is already counted in user and nice
    let total = fields.iter().take(8).sum::<u64>();
    let idle = field(3) + field(4);

    Ok(CpuTimes {
        busy: total.saturating_sub(idle),
        idle,
    })
}

fn parse_meminfo(meminfo: &str) -> io::Result<MemoryInfo> {
    let mut total = None;
    let mut available = None;
    let mut fallback = 0u64;

    for line in meminfo.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(kb) = rest
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok())
        else {
            continue;
        };
        match key {
            "MemTotal" => total = Some(kb),
            "MemAvailable" => available = Some(kb),
            "MemFree" | "Buffers" | "Cached" => fallback += kb,
            _ => {}
        }
    }

    let total_kb = total.ok_or_else(|| invalid("MemTotal missing from meminfo"))?;
    Ok(MemoryInfo {
        total_kb,
        available_kb: available.unwrap_or(fallback),
    })
}

#[derive(Clone)]
pub struct CpuCommand {
    source: Arc<dyn MetricsSource>,
    interval: Duration,
}

impl CpuCommand {
    pub fn new(source: Arc<dyn MetricsSource>, interval: Duration) -> Self {
        Self { source, interval }
    }
}

impl Command for CpuCommand {
    async fn execute(&self, _args: &str) -> Result<String, CommandError> {
        let before = self.source.cpu_times()?;
        tokio::time::sleep(self.interval).await;
        let after = self.source.cpu_times()?;
        Ok(format!("CPU Usage: {:.1}%", after.percent_since(&before)))
    }
}

#[derive(Clone)]
pub struct MemoryCommand {
    source: Arc<dyn MetricsSource>,
}

impl MemoryCommand {
    pub fn new(source: Arc<dyn MetricsSource>) -> Self {
        Self { source }
    }
}

impl Command for MemoryCommand {
    async fn execute(&self, _args: &str) -> Result<String, CommandError> {
        let info = self.source.memory()?;
        Ok(format!("Memory Usage: {:.1}% Used", info.used_percent()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "cpu  100 20 30 800 50 0 0 0 10 0\ncpu0 50 10 15 400 25 0 0 0 5 0\nintr 1 2 3\n";

    const MEMINFO: &str = "MemTotal:       16000000 kB\nMemFree:         2000000 kB\nMemAvailable:    4000000 kB\nBuffers:          500000 kB\nCached:          3000000 kB\n";

    #[test]
    fn test_parse_stat() {
        let times = parse_stat(STAT).unwrap();
        assert_eq!(times.idle, 850);
        assert_eq!(times.busy, 150);
    }

    #[test]
    fn test_parse_stat_rejects_garbage() {
        assert!(parse_stat("intr 1 2 3\n").is_err());
        assert!(parse_stat("cpu  1 x 3 4\n").is_err());
        assert!(parse_stat("cpu  1 2\n").is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let info = parse_meminfo(MEMINFO).unwrap();
        assert_eq!(info.total_kb, 16_000_000);
        assert_eq!(info.available_kb, 4_000_000);
        assert_eq!(info.used_percent(), 75.0);
    }

    #[test]
    fn test_parse_meminfo_without_available() {
        let old = "MemTotal: 1000 kB\nMemFree: 100 kB\nBuffers: 50 kB\nCached: 50 kB\n";
        let info = parse_meminfo(old).unwrap();
        assert_eq!(info.available_kb, 200);
        assert_eq!(info.used_percent(), 80.0);
    }

    #[test]
    fn test_percent_since_idle_interval() {
        let t = CpuTimes { busy: 10, idle: 10 };
        assert_eq!(t.percent_since(&t), 0.0);
    }

    #[tokio::test]
    async fn test_procfs_root_override() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("stat"), STAT).unwrap();
        fs::write(temp.path().join("meminfo"), MEMINFO).unwrap();
        let source: Arc<dyn MetricsSource> = Arc::new(ProcFs::with_root(temp.path()));

        let cpu = CpuCommand::new(source.clone(), Duration::from_millis(1));
        assert_eq!(cpu.execute("").await.unwrap(), "CPU Usage: 0.0%");

        let memory = MemoryCommand::new(source);
        assert_eq!(memory.execute("").await.unwrap(), "Memory Usage: 75.0% Used");
    }

    #[tokio::test]
    async fn test_missing_procfs_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let memory = MemoryCommand::new(Arc::new(ProcFs::with_root(temp.path())));
        assert!(matches!(
            memory.execute("").await,
            Err(CommandError::Execution(_))
        ));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_live_cpu_format() {
        let cpu = CpuCommand::new(Arc::new(ProcFs::new()), Duration::from_millis(50));
        let text = cpu.execute("").await.unwrap();
        let number = text
            .strip_prefix("CPU Usage: ")
            .and_then(|rest| rest.strip_suffix('%'))
            .unwrap();
        assert!(number.parse::<f64>().is_ok());
    }
}
