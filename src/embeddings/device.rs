// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Execution device description reported by `/health`

use serde::{Deserialize, Serialize};
use std::process::Command;
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::debug;

/// Which ONNX Runtime execution provider the session ended up on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Cuda,
    Cpu,
}

/// Device the resident model runs on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub kind: DeviceKind,
    /// Human-readable device name (e.g. "Tesla T4")
    pub name: String,
}

impl DeviceInfo {
    pub fn new(kind: DeviceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Describes the first CUDA device.
    ///
    /// ONNX Runtime does not expose device names, so this asks `nvidia-smi`
    /// and falls back to a generic label when it is unavailable.
    pub fn detect_cuda() -> Self {
        let name = Command::new("nvidia-smi")
            .args(["--query-gpu=name", "--format=csv,noheader"])
            .output()
            .ok()
            .filter(|out| out.status.success())
            .and_then(|out| {
                String::from_utf8_lossy(&out.stdout)
                    .lines()
                    .next()
                    .map(|line| line.trim().to_string())
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "CUDA device".to_string());

        debug!("Detected CUDA device: {}", name);
        Self::new(DeviceKind::Cuda, name)
    }

    /// Describes the host CPU using its brand string.
    pub fn detect_cpu() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::new().with_cpu(CpuRefreshKind::everything()),
        );
        let brand = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        Self::new(DeviceKind::Cpu, format!("CPU ({})", brand))
    }

    pub fn is_gpu(&self) -> bool {
        self.kind == DeviceKind::Cuda
    }
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
