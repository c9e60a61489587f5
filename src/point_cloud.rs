//! # Point cloud queries
//!
//! The AR tracking subsystem owns the point cloud and refreshes it every frame. This module only
//! reads it: [`nearest_point_along_ray`] is used to snap the cursor onto surfaces and to measure
//! range, [`farthest_distance_from_point`] scales the range dial.
//!
//! Both queries are linear scans. Per-frame clouds from device tracking are small, so there is no
//! acceleration structure.

use std::collections::BTreeMap;

use bevy_ecs::prelude::*;
use bevy_math::{Ray3d, Vec3};
use bevy_utils::tracing::*;
use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::primitives::closest_point_on_ray;

/// Returns the point on `ray` closest to any of the `points`, or `None` if there are no points.
///
/// Every sample is projected onto the ray's line and the projection belonging to the sample with
/// the smallest perpendicular distance wins. On ties the first sample encountered is kept.
pub fn nearest_point_along_ray(points: impl IntoIterator<Item = Vec3>, ray: Ray3d) -> Option<Vec3> {
    let mut closest_distance_squared = f32::MAX;
    let mut closest = None;
    for point in points {
        let (_, on_ray) = closest_point_on_ray(ray, point);
        let distance_squared = point.distance_squared(on_ray);
        if distance_squared < closest_distance_squared {
            closest_distance_squared = distance_squared;
            closest = Some(on_ray);
        }
    }
    closest
}

/// The largest distance from `origin` to any of the `points`, `0.0` if there are none.
pub fn farthest_distance_from_point(points: impl IntoIterator<Item = Vec3>, origin: Vec3) -> f32 {
    points
        .into_iter()
        .map(|point| point.distance(origin))
        .fold(0.0, f32::max)
}

/// The live set of sample positions reported by the AR tracking subsystem, grouped by the
/// trackable that produced them.
#[derive(Resource, Debug, Clone, Default)]
pub struct PointCloud {
    trackables: BTreeMap<u64, Vec<Vec3>>,
}

impl PointCloud {
    /// Builds a cloud holding a single trackable.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut cloud = PointCloud::default();
        cloud.insert(0, points.into_iter().collect());
        cloud
    }

    /// Replaces the samples of `trackable`.
    pub fn insert(&mut self, trackable: u64, positions: Vec<Vec3>) {
        self.trackables.insert(trackable, positions);
    }

    pub fn remove(&mut self, trackable: u64) -> Option<Vec<Vec3>> {
        self.trackables.remove(&trackable)
    }

    pub fn clear(&mut self) {
        self.trackables.clear();
    }

    /// Total number of samples across all trackables.
    pub fn len(&self) -> usize {
        self.trackables.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.trackables.values().all(Vec::is_empty)
    }

    /// Iterates over every sample, trackable by trackable in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.trackables.values().flatten().copied()
    }

    /// See [`nearest_point_along_ray`].
    pub fn nearest_point_along_ray(&self, ray: Ray3d) -> Option<Vec3> {
        let _span = info_span!("nearest point along ray", samples = self.len()).entered();
        nearest_point_along_ray(self.iter(), ray)
    }

    /// See [`farthest_distance_from_point`].
    pub fn farthest_distance_from_point(&self, origin: Vec3) -> f32 {
        let _span = info_span!("farthest point", samples = self.len()).entered();
        farthest_distance_from_point(self.iter(), origin)
    }
}

/// A change to the point cloud pushed by the tracking subsystem.
#[derive(Debug, Clone, PartialEq)]
pub enum PointCloudUpdate {
    Updated { trackable: u64, positions: Vec<Vec3> },
    Removed { trackable: u64 },
}

/// Receives [`PointCloudUpdate`]s from a tracking thread. Insert this resource to have
/// [`drain_point_cloud_feed`] keep the [`PointCloud`] current.
#[derive(Resource)]
pub struct PointCloudFeed {
    receiver: Receiver<PointCloudUpdate>,
    disconnected: bool,
}

impl PointCloudFeed {
    /// Creates a feed and the sender the tracking side should push updates into.
    pub fn unbounded() -> (Sender<PointCloudUpdate>, Self) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (sender, Self::new(receiver))
    }

    pub fn new(receiver: Receiver<PointCloudUpdate>) -> Self {
        PointCloudFeed {
            receiver,
            disconnected: false,
        }
    }

    /// Applies every pending update to `cloud`, returning how many were applied.
    pub fn drain_into(&mut self, cloud: &mut PointCloud) -> usize {
        let mut applied = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(PointCloudUpdate::Updated {
                    trackable,
                    positions,
                }) => cloud.insert(trackable, positions),
                Ok(PointCloudUpdate::Removed { trackable }) => {
                    cloud.remove(trackable);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        warn!("Point cloud feed disconnected, keeping the last received samples");
                        self.disconnected = true;
                    }
                    break;
                }
            }
            applied += 1;
        }
        applied
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

/// Moves pending tracking updates into the [`PointCloud`] resource.
pub fn drain_point_cloud_feed(
    feed: Option<ResMut<PointCloudFeed>>,
    mut cloud: ResMut<PointCloud>,
) {
    if let Some(mut feed) = feed {
        feed.drain_into(&mut cloud);
    }
}
