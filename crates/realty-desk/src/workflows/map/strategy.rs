use serde::Serialize;

/// Largest point set still clustered on the client.
pub const CLIENT_CLUSTER_LIMIT: usize = 100;

/// How the map obtains its clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    /// Cluster the already-loaded points locally.
    ClientClusters,
    /// Fetch pre-clustered features for the visible bounds.
    ServerClusters,
}

impl RenderStrategy {
    pub const fn uses_server_clustering(self) -> bool {
        matches!(self, RenderStrategy::ServerClusters)
    }
}

/// An empty point list means nothing was preloaded, so the server has to supply the map.
pub fn select_render_strategy(point_count: usize) -> RenderStrategy {
    if point_count == 0 || point_count > CLIENT_CLUSTER_LIMIT {
        RenderStrategy::ServerClusters
    } else {
        RenderStrategy::ClientClusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_counts() {
        assert_eq!(select_render_strategy(0), RenderStrategy::ServerClusters);
        assert_eq!(select_render_strategy(1), RenderStrategy::ClientClusters);
        assert_eq!(select_render_strategy(100), RenderStrategy::ClientClusters);
        assert_eq!(select_render_strategy(101), RenderStrategy::ServerClusters);
    }

    #[test]
    fn serializes_snake_case() {
        let value = serde_json::to_value(RenderStrategy::ServerClusters).expect("serialize");
        assert_eq!(value, serde_json::json!("server_clusters"));
        assert!(RenderStrategy::ServerClusters.uses_server_clustering());
        assert!(!RenderStrategy::ClientClusters.uses_server_clustering());
    }
}
