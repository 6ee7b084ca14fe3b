//! Process performance snapshot attached to PERF records

use std::fmt;

/// Process counters, memory figures in megabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerfMetrics {
    /// OS threads of the process
    pub tasks: u64,
    pub alloc: f64,
    pub sys: f64,
    pub heap_alloc: f64,
    pub heap_sys: f64,
    pub heap_idle: f64,
    pub heap_inuse: f64,
    pub stack_sys: f64,
}

impl PerfMetrics {
    /// Take a snapshot of the current process.
    pub fn collect() -> Self {
        #[cfg(target_os = "linux")]
        {
            if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
                return Self::from_proc_status(&status);
            }
        }
        Self {
            tasks: 1,
            ..Self::default()
        }
    }

    /// Build a snapshot from the contents of `/proc/<pid>/status`.
    pub fn from_proc_status(status: &str) -> Self {
        let mut threads = 1;
        let mut rss_anon = 0;
        let mut vm_size = 0;
        let mut vm_data = 0;
        let mut vm_stk = 0;

        for line in status.lines() {
            let Some((key, rest)) = line.split_once(':') else {
                continue;
            };
            let Some(value) = rest.split_whitespace().next().and_then(|v| v.parse::<u64>().ok())
            else {
                continue;
            };
            match key {
                "Threads" => threads = value,
                "RssAnon" => rss_anon = value,
                "VmSize" => vm_size = value,
                "VmData" => vm_data = value,
                "VmStk" => vm_stk = value,
                _ => {}
            }
        }

        Self {
            tasks: threads,
            alloc: kb_to_mb(rss_anon),
            sys: kb_to_mb(vm_size),
            heap_alloc: kb_to_mb(rss_anon),
            heap_sys: kb_to_mb(vm_data),
            heap_idle: kb_to_mb(vm_data.saturating_sub(rss_anon)),
            heap_inuse: kb_to_mb(rss_anon),
            stack_sys: kb_to_mb(vm_stk),
        }
    }
}

fn kb_to_mb(kb: u64) -> f64 {
    kb as f64 / 1024.0
}

impl fmt::Display for PerfMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "goroutines:{},alloc:{:.6} MB,sys:{:.6} MB,heap_alloc:{:.6} MB,heap_sys:{:.6} MB,\
             heap_idle:{:.6} MB,heap_inuse:{:.6} MB,stack_sys:{:.6} MB",
            self.tasks,
            self.alloc,
            self.sys,
            self.heap_alloc,
            self.heap_sys,
            self.heap_idle,
            self.heap_inuse,
            self.stack_sys,
        )
    }
}

/// The `[perf]` value: a fresh snapshot rendered as comma-joined
/// `key:value` tokens.
pub fn performance_metrics() -> String {
    PerfMetrics::collect().to_string()
}
