use crate::error::Result;
use crate::raster::{thin, Raster};
use crate::topology::{AdjacencyGraph, Network, TopologyParser};

/// Parameters for extracting a road network from a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractParams {
    /// Thin the raster to a one-pixel skeleton first. Only planar rasters
    /// can be thinned.
    pub thin: bool,
    /// Extract closed loops that touch no intersection. Off by default.
    pub include_orphan_loops: bool,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            thin: true,
            include_orphan_loops: false,
        }
    }
}

/// The skeleton a network was parsed from, and the network.
#[derive(Debug)]
pub struct Extraction {
    pub skeleton: Raster,
    pub network: Network,
}

/// Extracts lines and intersections from a road mask.
#[derive(Debug)]
pub struct ExtractNetwork<'a> {
    raster: &'a Raster,
    params: ExtractParams,
}

impl<'a> ExtractNetwork<'a> {
    /// Creates a new extraction.
    #[must_use]
    pub fn new(raster: &'a Raster, params: ExtractParams) -> Self {
        Self { raster, params }
    }

    /// Executes the extraction.
    ///
    /// # Errors
    ///
    /// - `TopologyError::EmptyTopology` if the skeleton has no foreground
    ///   pixels
    /// - `OperationError::InvalidInput` if thinning is requested for a
    ///   raster with more than one vertical layer
    pub fn execute(&self) -> Result<Extraction> {
        let skeleton = if self.params.thin {
            thin(self.raster)?
        } else {
            self.raster.clone()
        };
        let graph = AdjacencyGraph::from_raster(&skeleton);
        let network = TopologyParser::new(&graph).parse(self.params.include_orphan_loops)?;
        tracing::debug!(
            pixels = skeleton.count(),
            lines = network.line_count(),
            intersections = network.intersection_count(),
            "extracted network"
        );
        Ok(Extraction { skeleton, network })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{OperationError, TopologyError};
    use crate::topology::LineEnd;
    use crate::RoadweaveError;

    #[test]
    fn thick_cross_becomes_a_junction() {
        let raster = Raster::from_ascii(
            "....###....\n\
             ....###....\n\
             ....###....\n\
             ###########\n\
             ###########\n\
             ###########\n\
             ....###....\n\
             ....###....\n\
             ....###....\n",
        )
        .unwrap();
        let extraction = ExtractNetwork::new(&raster, ExtractParams::default())
            .execute()
            .unwrap();
        assert!(extraction.skeleton.count() < raster.count());
        let network = extraction.network;
        assert!(network.intersection_count() >= 1);
        assert!(network.line_count() >= 4);
        assert!(network
            .lines()
            .any(|(_, l)| matches!(l.start, LineEnd::Intersection { .. })));
    }

    #[test]
    fn skeleton_input_without_thinning() {
        let raster = Raster::from_ascii("######\n").unwrap();
        let params = ExtractParams {
            thin: false,
            ..ExtractParams::default()
        };
        let extraction = ExtractNetwork::new(&raster, params).execute().unwrap();
        assert_eq!(extraction.skeleton, raster);
        assert_eq!(extraction.network.line_count(), 1);
    }

    #[test]
    fn orphan_loops_follow_the_flag() {
        let raster = Raster::from_ascii(
            "#####\n\
             #...#\n\
             #...#\n\
             #####\n",
        )
        .unwrap();
        let base = ExtractParams {
            thin: false,
            include_orphan_loops: false,
        };
        let without = ExtractNetwork::new(&raster, base).execute().unwrap();
        assert_eq!(without.network.line_count(), 0);

        let with = ExtractNetwork::new(
            &raster,
            ExtractParams {
                include_orphan_loops: true,
                ..base
            },
        )
        .execute()
        .unwrap();
        assert_eq!(with.network.line_count(), 1);
    }

    #[test]
    fn empty_raster_fails() {
        let raster = Raster::new(5, 1, 5);
        let result = ExtractNetwork::new(&raster, ExtractParams::default()).execute();
        assert!(matches!(
            result,
            Err(RoadweaveError::Topology(TopologyError::EmptyTopology))
        ));
    }

    #[test]
    fn volumes_cannot_be_thinned() {
        let mut raster = Raster::new(3, 3, 3);
        raster.set(1, 1, 1, true);
        let result = ExtractNetwork::new(&raster, ExtractParams::default()).execute();
        assert!(matches!(
            result,
            Err(RoadweaveError::Operation(OperationError::InvalidInput(_)))
        ));

        let params = ExtractParams {
            thin: false,
            include_orphan_loops: false,
        };
        assert!(ExtractNetwork::new(&raster, params).execute().is_ok());
    }
}
