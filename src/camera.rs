//! Camera model and ray-generation math.
//!
//! Right-handed, Y-up, -Z forward. The same basis feeds the WGSL kernel,
//! the CPU reference tracer and the debug overlay's view matrix, so the
//! three stay pixel-consistent.

use glam::{Mat3, Mat4, Vec3, Vec4};

/// World up vector used to derive the camera's right axis.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Pinhole camera. Rotation is in degrees: yaw around Y, pitch around X,
/// roll unused. `fov` is the vertical field of view in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Vec3,
    pub fov: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            fov: 60.0,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}

/// Orthonormal basis derived from the camera rotation.
#[derive(Debug, Clone, Copy)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Camera {
    /// Forward/right/up from yaw (rotation.y) and pitch (rotation.x).
    /// Forward is `R_y(yaw) * R_x(pitch) * (0,0,-1)`.
    pub fn basis(&self) -> CameraBasis {
        let yaw = self.rotation.y.to_radians();
        let pitch = self.rotation.x.to_radians();
        let forward = Mat3::from_rotation_y(yaw) * (Mat3::from_rotation_x(pitch) * Vec3::NEG_Z);
        let right = forward.cross(WORLD_UP).normalize();
        let up = right.cross(forward);
        CameraBasis { forward, right, up }
    }

    /// Focal length for a unit-height image plane.
    pub fn focal_length(&self) -> f32 {
        1.0 / (self.fov.to_radians() * 0.5).tan()
    }

    /// Primary ray direction for pixel (px, py) with a sub-pixel jitter in
    /// [-0.5, 0.5)^2. Matches the kernel's NDC mapping exactly.
    pub fn ray_direction(&self, px: u32, py: u32, width: u32, height: u32, jitter: (f32, f32)) -> Vec3 {
        let basis = self.basis();
        let w = width as f32;
        let h = height as f32;
        let aspect = w / h;
        let u = (px as f32 + 0.5) / w + jitter.0 / w;
        let v = (py as f32 + 0.5) / h + jitter.1 / h;
        let nx = (2.0 * u - 1.0) * aspect;
        let ny = 1.0 - 2.0 * v;
        (basis.right * nx + basis.up * ny + basis.forward * self.focal_length()).normalize()
    }

    /// View matrix for the overlay pass, built from the same basis as the
    /// kernel's ray generation.
    pub fn view_matrix(&self) -> Mat4 {
        let CameraBasis { forward, right, up } = self.basis();
        let pos = self.position;
        Mat4::from_cols(
            Vec4::new(right.x, up.x, -forward.x, 0.0),
            Vec4::new(right.y, up.y, -forward.y, 0.0),
            Vec4::new(right.z, up.z, -forward.z, 0.0),
            Vec4::new(-right.dot(pos), -up.dot(pos), forward.dot(pos), 1.0),
        )
    }

    /// Standard perspective projection (wgpu 0..1 depth).
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near_plane, self.far_plane)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}
