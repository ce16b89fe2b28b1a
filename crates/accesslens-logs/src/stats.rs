use std::collections::HashMap;

use accesslens_types::{LogRow, StatusClass};

/// Number of entries reported by the top-IP and top-path tables
pub const DEFAULT_TOP_N: usize = 10;

/// Counts per status class
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub success: u64,
    pub redirect: u64,
    pub client_error: u64,
    pub server_error: u64,
}

impl StatusCounts {
    fn increment(&mut self, class: StatusClass) {
        match class {
            StatusClass::Success => self.success += 1,
            StatusClass::Redirect => self.redirect += 1,
            StatusClass::ClientError => self.client_error += 1,
            StatusClass::ServerError => self.server_error += 1,
        }
    }

    pub fn get(&self, class: StatusClass) -> u64 {
        match class {
            StatusClass::Success => self.success,
            StatusClass::Redirect => self.redirect,
            StatusClass::ClientError => self.client_error,
            StatusClass::ServerError => self.server_error,
        }
    }

    pub fn total(&self) -> u64 {
        self.success + self.redirect + self.client_error + self.server_error
    }
}

/// Hit counters accumulated over the rows accepted in one pipeline run.
/// Counters only ever grow.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregateStats {
    ips: HashMap<String, u64>,
    paths: HashMap<String, u64>,
    status: StatusCounts,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an accepted row
    pub fn record(&mut self, row: &LogRow) {
        if !row.ip.is_empty() {
            *self.ips.entry(row.ip.clone()).or_insert(0) += 1;
        }
        if !row.path.is_empty() {
            *self.paths.entry(row.path.clone()).or_insert(0) += 1;
        }
        if let Some(class) = row.status_class() {
            self.status.increment(class);
        }
    }

    /// Busiest client IPs, count descending then IP ascending
    pub fn top_ips(&self, n: usize) -> Vec<(String, u64)> {
        top_n(&self.ips, n)
    }

    /// Busiest request paths, count descending then path ascending
    pub fn top_paths(&self, n: usize) -> Vec<(String, u64)> {
        top_n(&self.paths, n)
    }

    /// All four status buckets in order, zero counts included
    pub fn status_buckets(&self) -> Vec<(StatusClass, u64)> {
        StatusClass::ALL
            .iter()
            .map(|class| (*class, self.status.get(*class)))
            .collect()
    }

    pub fn status_counts(&self) -> &StatusCounts {
        &self.status
    }

    pub fn ip_hits(&self, ip: &str) -> u64 {
        self.ips.get(ip).copied().unwrap_or(0)
    }

    pub fn path_hits(&self, path: &str) -> u64 {
        self.paths.get(path).copied().unwrap_or(0)
    }
}

fn top_n(counts: &HashMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut pairs: Vec<(&String, u64)> = counts.iter().map(|(k, v)| (k, *v)).collect();
    pairs.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
    pairs
        .into_iter()
        .take(n)
        .map(|(k, v)| (k.clone(), v))
        .collect()
}
