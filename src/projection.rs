//! Spherical two-point equidistant projection.
//!
//! Distances from either control point are preserved, which keeps the whole
//! European theatre within low distortion when the control points straddle it.

use serde::Serialize;

/// Earth radius used for the spherical model (WGS84 semi-major axis, metres).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Control points of the atlas projection: (lat 48, lon 2) and (lat 48, lon 21).
pub const ATLAS_CONTROL_POINTS: ((f64, f64), (f64, f64)) = ((2.0, 48.0), (21.0, 48.0));

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TwoPointEquidistant {
    lon_1: f64,
    lat_1: f64,
    lon_2: f64,
    lat_2: f64,
    radius: f64,
    // Derived constants, all in radians / unit-sphere terms.
    lam0: f64,
    half_dlam: f64,
    sp1: f64,
    cp1: f64,
    sp2: f64,
    cp2: f64,
    cs: f64,
    sc: f64,
    ccs: f64,
    z02: f64,
    r2z0: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("control points must be distinct")]
    CoincidentPoints,
}

impl TwoPointEquidistant {
    /// Build a projection from two (lon, lat) control points in degrees.
    pub fn new(point_1: (f64, f64), point_2: (f64, f64), radius: f64) -> Result<Self, ProjectionError> {
        let (lon_1, lat_1) = point_1;
        let (lon_2, lat_2) = point_2;
        let (lam_1, phi_1) = (lon_1.to_radians(), lat_1.to_radians());
        let (lam_2, phi_2) = (lon_2.to_radians(), lat_2.to_radians());

        let lam0 = wrap_longitude(0.5 * (lam_1 + lam_2));
        let dlam2 = wrap_longitude(lam_2 - lam_1);
        let (sp1, cp1) = phi_1.sin_cos();
        let (sp2, cp2) = phi_2.sin_cos();

        let z0 = clamped_acos(sp1 * sp2 + cp1 * cp2 * dlam2.cos());
        if z0 == 0.0 {
            return Err(ProjectionError::CoincidentPoints);
        }

        Ok(Self {
            lon_1,
            lat_1,
            lon_2,
            lat_2,
            radius,
            lam0,
            half_dlam: 0.5 * dlam2,
            sp1,
            cp1,
            sp2,
            cp2,
            cs: cp1 * sp2,
            sc: sp1 * cp2,
            ccs: cp1 * cp2 * dlam2.sin(),
            z02: z0 * z0,
            r2z0: 0.5 / z0,
        })
    }

    /// The projection the atlas renders in.
    pub fn atlas() -> Self {
        let (p1, p2) = ATLAS_CONTROL_POINTS;
        match Self::new(p1, p2, EARTH_RADIUS_M) {
            Ok(projection) => projection,
            Err(_) => unreachable!("atlas control points are distinct"),
        }
    }

    pub fn control_points(&self) -> ((f64, f64), (f64, f64)) {
        ((self.lon_1, self.lat_1), (self.lon_2, self.lat_2))
    }

    /// Project a geographic point (degrees) into plane coordinates (metres).
    pub fn geo_to_plane(&self, lon: f64, lat: f64) -> (f64, f64) {
        let lam = wrap_longitude(lon.to_radians() - self.lam0);
        let (sp, cp) = lat.to_radians().sin_cos();

        let dl1 = lam + self.half_dlam;
        let dl2 = lam - self.half_dlam;
        let z1 = clamped_acos(self.sp1 * sp + self.cp1 * cp * dl1.cos());
        let z2 = clamped_acos(self.sp2 * sp + self.cp2 * cp * dl2.cos());
        let z1 = z1 * z1;
        let z2 = z2 * z2;

        let t = z1 - z2;
        let x = self.r2z0 * t;
        let t = self.z02 - t;
        let mut y = self.r2z0 * (4.0 * self.z02 * z2 - t * t).max(0.0).sqrt();
        if self.ccs * sp - cp * (self.cs * dl1.sin() - self.sc * dl2.sin()) < 0.0 {
            y = -y;
        }

        (x * self.radius, y * self.radius)
    }
}

fn clamped_acos(value: f64) -> f64 {
    value.clamp(-1.0, 1.0).acos()
}

fn wrap_longitude(lam: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    if lam.abs() <= PI {
        return lam;
    }
    lam - TAU * ((lam + PI) / TAU).floor()
}

/// Great-circle distance between two (lon, lat) points on the projection sphere.
pub fn great_circle_distance(a: (f64, f64), b: (f64, f64), radius: f64) -> f64 {
    let (sa, ca) = a.1.to_radians().sin_cos();
    let (sb, cb) = b.1.to_radians().sin_cos();
    let dlon = (b.0 - a.0).to_radians();
    clamped_acos(sa * sb + ca * cb * dlon.cos()) * radius
}
