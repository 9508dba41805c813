use std::collections::VecDeque;

use crate::model::{
    FeatureImportance, HeatmapSample, PlayerSnapshot, PredictionInput, PredictionResponse,
};

pub const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Success,
    Failed,
}

/// Sections filled by fetches that run after the player snapshot arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Heatmap,
    FeatureImportance,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Section::Heatmap => "heatmap",
            Section::FeatureImportance => "feature importance",
        }
    }
}

/// One player-load request. `generation` only ever increases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub player: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionTicket {
    pub generation: u64,
    pub input: PredictionInput,
}

/// Work for the fetch provider thread.
#[derive(Debug, Clone)]
pub enum ProviderCommand {
    LoadPlayer(LoadTicket),
    Predict(PredictionTicket),
}

/// Results flowing back from fetch workers to the UI loop.
#[derive(Debug, Clone)]
pub enum Delta {
    PlayerLoaded {
        generation: u64,
        player: String,
        snapshot: Box<PlayerSnapshot>,
    },
    PlayerFailed {
        generation: u64,
        player: String,
        error: String,
    },
    HeatmapLoaded {
        generation: u64,
        player: String,
        sample: HeatmapSample,
    },
    ImportanceLoaded {
        generation: u64,
        importance: FeatureImportance,
    },
    SectionFailed {
        generation: u64,
        section: Section,
        error: String,
    },
    PredictionResolved {
        generation: u64,
        response: PredictionResponse,
    },
    PredictionFailed {
        generation: u64,
        error: String,
    },
    Log(LogLevel, String),
}

impl Delta {
    pub fn generation(&self) -> Option<u64> {
        match self {
            Delta::PlayerLoaded { generation, .. }
            | Delta::PlayerFailed { generation, .. }
            | Delta::HeatmapLoaded { generation, .. }
            | Delta::ImportanceLoaded { generation, .. }
            | Delta::SectionFailed { generation, .. }
            | Delta::PredictionResolved { generation, .. }
            | Delta::PredictionFailed { generation, .. } => Some(*generation),
            Delta::Log(..) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn tag(self) -> &'static str {
        match self {
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Info => "[INFO]",
            LogLevel::Warn => "[WARN]",
            LogLevel::Error => "[ERROR]",
        }
    }
}

/// Bounded diagnostic log shown in the console panel.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    entries: VecDeque<String>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: LogLevel, msg: impl AsRef<str>) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.entries.push_back(format!("{stamp} {} {}", level.tag(), msg.as_ref()));
        while self.entries.len() > MAX_LOGS {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.contains(level.tag()) && e.contains(needle))
    }
}
