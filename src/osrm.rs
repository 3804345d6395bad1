//! OSRM HTTP adapter for walking-time matrices.

use serde::Deserialize;

use crate::error::MatrixError;
use crate::matrix::CostMatrix;
use crate::traits::{locations_of, CostMatrixProvider, PointOfInterest};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
    /// Maximum coordinates per table request.
    pub max_batch: usize,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "foot".to_string(),
            timeout_secs: 60,
            max_batch: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("itinerary-planner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, client })
    }

    /// Durations from every `sources` location to every `destinations` location.
    fn table(
        &self,
        sources: &[(f64, f64)],
        destinations: &[(f64, f64)],
    ) -> Result<Vec<Vec<Option<f64>>>, MatrixError> {
        let coords = sources
            .iter()
            .chain(destinations)
            .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
            .collect::<Vec<_>>()
            .join(";");
        let source_idx = (0..sources.len()).map(|i| i.to_string()).collect::<Vec<_>>().join(";");
        let destination_idx = (sources.len()..sources.len() + destinations.len())
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(";");

        let url = format!(
            "{}/table/v1/{}/{}?annotations=duration&sources={}&destinations={}",
            self.config.base_url, self.config.profile, coords, source_idx, destination_idx
        );

        let body = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmTableResponse>())?;

        if body.code != "Ok" {
            return Err(MatrixError::MalformedResponse(format!("OSRM returned code {}", body.code)));
        }
        let durations = body
            .durations
            .ok_or_else(|| MatrixError::MalformedResponse("missing durations".to_string()))?;
        if durations.len() != sources.len() || durations.iter().any(|row| row.len() != destinations.len()) {
            return Err(MatrixError::MalformedResponse(format!(
                "expected a {}x{} table",
                sources.len(),
                destinations.len()
            )));
        }
        Ok(durations)
    }
}

impl CostMatrixProvider for OsrmClient {
    fn cost_matrix<P: PointOfInterest>(&self, pois: &[P]) -> Result<CostMatrix, MatrixError> {
        let locations = locations_of(pois)?;
        let ids: Vec<String> = pois.iter().map(|poi| poi.id().to_string()).collect();
        let mut matrix = CostMatrix::unreachable(ids)?;

        let batch = self.config.max_batch.max(1);
        let chunks: Vec<(usize, &[(f64, f64)])> = locations
            .chunks(batch)
            .enumerate()
            .map(|(i, chunk)| (i * batch, chunk))
            .collect();

        for &(src_offset, sources) in &chunks {
            for &(dst_offset, destinations) in &chunks {
                let table = self.table(sources, destinations)?;
                for (i, row) in table.into_iter().enumerate() {
                    for (j, value) in row.into_iter().enumerate() {
                        let (from, to) = (src_offset + i, dst_offset + j);
                        if from != to {
                            matrix.set(from, to, value.map(|secs| secs.round() as u32));
                        }
                    }
                }
            }
        }

        tracing::debug!(
            pois = pois.len(),
            unreachable = matrix.unreachable_pairs(),
            profile = %self.config.profile,
            "fetched OSRM walking matrix"
        );
        Ok(matrix)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    durations: Option<Vec<Vec<Option<f64>>>>,
}
