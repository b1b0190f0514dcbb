use glam::{Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Profile revolved by the default lathe: a diamond outline around the Y axis.
pub const DEFAULT_LATHE_PROFILE: [Vec2; 3] = [Vec2::new(0.0, -0.5), Vec2::new(0.5, 0.0), Vec2::new(0.0, 0.5)];

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self { position: position.to_array(), normal: normal.to_array(), uv: uv.to_array() }
    }

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
                wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
                wgpu::VertexAttribute { offset: 24, shader_location: 2, format: wgpu::VertexFormat::Float32x2 },
            ],
        }
    }
}

/// Indexed triangle list with per-vertex normals.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub bounds: MeshBounds,
}

#[derive(Clone, Debug)]
pub struct MeshBounds {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
    pub radius: f32,
}

impl Mesh {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        let bounds = MeshBounds::from_vertices(&vertices);
        Self { vertices, indices, bounds }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn cube(size: f32) -> Self {
        let hs = size * 0.5;
        let positions = [
            Vec3::new(-hs, -hs, -hs),
            Vec3::new(hs, -hs, -hs),
            Vec3::new(hs, hs, -hs),
            Vec3::new(-hs, hs, -hs),
            Vec3::new(-hs, -hs, hs),
            Vec3::new(hs, -hs, hs),
            Vec3::new(hs, hs, hs),
            Vec3::new(-hs, hs, hs),
        ];
        let normals = [
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        ];

        let uv_quad = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
        let mut vertices = Vec::with_capacity(24);
        let mut write_face = |indices: [usize; 4], normal: Vec3| {
            for (i, &index) in indices.iter().enumerate() {
                vertices.push(MeshVertex::new(positions[index], normal, uv_quad[i]));
            }
        };

        write_face([0, 3, 2, 1], normals[0]); // back
        write_face([4, 5, 6, 7], normals[1]); // front
        write_face([0, 4, 7, 3], normals[2]); // left
        write_face([1, 2, 6, 5], normals[3]); // right
        write_face([3, 7, 6, 2], normals[4]); // top
        write_face([0, 1, 5, 4], normals[5]); // bottom

        let mut indices = Vec::with_capacity(36);
        for face in 0..6 {
            let base = face * 4;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(vertices, indices)
    }

    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut vertices = Vec::new();
        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(height_segments as usize + 1);

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            // Poles get their u shifted half a segment so the fan converges in texture space.
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };
            let mut row = Vec::with_capacity(width_segments as usize + 1);
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let position = Vec3::new(
                    -radius * (u * TAU).cos() * (v * PI).sin(),
                    radius * (v * PI).cos(),
                    radius * (u * TAU).sin() * (v * PI).sin(),
                );
                let normal = position.normalize_or_zero();
                row.push(vertices.len() as u32);
                vertices.push(MeshVertex::new(position, normal, Vec2::new(u + u_offset, 1.0 - v)));
            }
            grid.push(row);
        }

        let mut indices = Vec::new();
        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments as usize - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self::new(vertices, indices)
    }

    /// Capped cylinder along Y, centered on the origin. A zero top radius makes a cone.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> Self {
        let radial_segments = radial_segments.max(3);
        let half_height = height * 0.5;
        let slope = (radius_bottom - radius_top) / height;
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        let mut rows: [Vec<u32>; 2] = [Vec::new(), Vec::new()];
        for (y, row) in rows.iter_mut().enumerate() {
            let v = y as f32;
            let radius = v * (radius_bottom - radius_top) + radius_top;
            for x in 0..=radial_segments {
                let u = x as f32 / radial_segments as f32;
                let theta = u * TAU;
                let (sin, cos) = theta.sin_cos();
                let position = Vec3::new(radius * sin, -v * height + half_height, radius * cos);
                let normal = Vec3::new(sin, slope, cos).normalize();
                row.push(vertices.len() as u32);
                vertices.push(MeshVertex::new(position, normal, Vec2::new(u, 1.0 - v)));
            }
        }
        for x in 0..radial_segments as usize {
            let a = rows[0][x];
            let b = rows[1][x];
            let c = rows[1][x + 1];
            let d = rows[0][x + 1];
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }

        if radius_top > 0.0 {
            push_cap(&mut vertices, &mut indices, radius_top, half_height, radial_segments, true);
        }
        if radius_bottom > 0.0 {
            push_cap(&mut vertices, &mut indices, radius_bottom, half_height, radial_segments, false);
        }

        Self::new(vertices, indices)
    }

    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self::cylinder(0.0, radius, height, radial_segments)
    }

    /// Flat disc in the XY plane facing +Z.
    pub fn circle(radius: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut vertices = Vec::with_capacity(segments as usize + 2);
        vertices.push(MeshVertex::new(Vec3::ZERO, Vec3::Z, Vec2::splat(0.5)));
        for s in 0..=segments {
            let theta = s as f32 / segments as f32 * TAU;
            let position = Vec3::new(radius * theta.cos(), radius * theta.sin(), 0.0);
            let uv = Vec2::new((position.x / radius + 1.0) * 0.5, (position.y / radius + 1.0) * 0.5);
            vertices.push(MeshVertex::new(position, Vec3::Z, uv));
        }
        let mut indices = Vec::with_capacity(segments as usize * 3);
        for i in 1..=segments {
            indices.extend_from_slice(&[i, i + 1, 0]);
        }
        Self::new(vertices, indices)
    }

    /// Flat annulus in the XY plane facing +Z.
    pub fn ring(inner_radius: f32, outer_radius: f32, theta_segments: u32, phi_segments: u32) -> Self {
        let theta_segments = theta_segments.max(3);
        let phi_segments = phi_segments.max(1);
        let radius_step = (outer_radius - inner_radius) / phi_segments as f32;
        let mut vertices = Vec::new();
        let mut radius = inner_radius;
        for _ in 0..=phi_segments {
            for i in 0..=theta_segments {
                let theta = i as f32 / theta_segments as f32 * TAU;
                let position = Vec3::new(radius * theta.cos(), radius * theta.sin(), 0.0);
                let uv = Vec2::new(
                    (position.x / outer_radius + 1.0) * 0.5,
                    (position.y / outer_radius + 1.0) * 0.5,
                );
                vertices.push(MeshVertex::new(position, Vec3::Z, uv));
            }
            radius += radius_step;
        }

        let mut indices = Vec::new();
        for j in 0..phi_segments {
            let level = j * (theta_segments + 1);
            for i in 0..theta_segments {
                let segment = i + level;
                let a = segment;
                let b = segment + theta_segments + 1;
                let c = segment + theta_segments + 2;
                let d = segment + 1;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        Self::new(vertices, indices)
    }

    /// Revolves `profile` (x = distance from the Y axis) a full turn around Y.
    pub fn lathe(profile: &[Vec2], segments: u32) -> Self {
        let segments = segments.max(1);
        let count = profile.len();
        if count < 2 {
            return Self::new(Vec::new(), Vec::new());
        }
        let profile_normals = lathe_profile_normals(profile);
        let mut vertices = Vec::with_capacity((segments as usize + 1) * count);
        for i in 0..=segments {
            let phi = i as f32 / segments as f32 * TAU;
            let (sin, cos) = phi.sin_cos();
            for (j, point) in profile.iter().enumerate() {
                let position = Vec3::new(point.x * sin, point.y, point.x * cos);
                let n = profile_normals[j];
                let normal = Vec3::new(n.x * sin, n.y, n.x * cos);
                let uv = Vec2::new(i as f32 / segments as f32, j as f32 / (count - 1) as f32);
                vertices.push(MeshVertex::new(position, normal, uv));
            }
        }

        let count = count as u32;
        let mut indices = Vec::new();
        for i in 0..segments {
            for j in 0..count - 1 {
                let base = j + i * count;
                let a = base;
                let b = base + count;
                let c = base + count + 1;
                let d = base + 1;
                indices.extend_from_slice(&[a, b, d, c, d, b]);
            }
        }
        Self::new(vertices, indices)
    }

    /// Cylinder of `length` with hemispherical ends, built as a lathe of its outline.
    pub fn capsule(radius: f32, length: f32, cap_segments: u32, radial_segments: u32) -> Self {
        // Arcs are sampled at twice the cap segment count, matching curve path sampling.
        let divisions = cap_segments.max(1) * 2;
        let half = length * 0.5;
        let mut profile = Vec::with_capacity(divisions as usize * 2 + 2);
        for i in 0..=divisions {
            let angle = 1.5 * PI + i as f32 / divisions as f32 * FRAC_PI_2;
            profile.push(Vec2::new(radius * angle.cos(), -half + radius * angle.sin()));
        }
        for i in 0..=divisions {
            let angle = i as f32 / divisions as f32 * FRAC_PI_2;
            profile.push(Vec2::new(radius * angle.cos(), half + radius * angle.sin()));
        }
        // The end points sit on the axis; clamp the float noise from cos(3/2 pi).
        for point in profile.iter_mut() {
            if point.x.abs() < 1e-6 {
                point.x = 0.0;
            }
        }
        Self::lathe(&profile, radial_segments)
    }

    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        let radial_segments = radial_segments.max(2);
        let tubular_segments = tubular_segments.max(3);
        let mut vertices = Vec::new();
        for j in 0..=radial_segments {
            for i in 0..=tubular_segments {
                let u = i as f32 / tubular_segments as f32 * TAU;
                let v = j as f32 / radial_segments as f32 * TAU;
                let position = Vec3::new(
                    (radius + tube * v.cos()) * u.cos(),
                    (radius + tube * v.cos()) * u.sin(),
                    tube * v.sin(),
                );
                let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
                let normal = (position - center).normalize_or_zero();
                let uv = Vec2::new(i as f32 / tubular_segments as f32, j as f32 / radial_segments as f32);
                vertices.push(MeshVertex::new(position, normal, uv));
            }
        }

        let stride = tubular_segments + 1;
        let mut indices = Vec::new();
        for j in 1..=radial_segments {
            for i in 1..=tubular_segments {
                let a = stride * j + i - 1;
                let b = stride * (j - 1) + i - 1;
                let c = stride * (j - 1) + i;
                let d = stride * j + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        Self::new(vertices, indices)
    }

    /// Tube swept along a (p, q) torus knot.
    pub fn torus_knot(radius: f32, tube: f32, tubular_segments: u32, radial_segments: u32, p: u32, q: u32) -> Self {
        let tubular_segments = tubular_segments.max(3);
        let radial_segments = radial_segments.max(3);
        let (p, q) = (p.max(1) as f32, q as f32);
        let knot_point = |u: f32| {
            let qu_over_p = q / p * u;
            let cs = qu_over_p.cos();
            Vec3::new(
                radius * (2.0 + cs) * 0.5 * u.cos(),
                radius * (2.0 + cs) * u.sin() * 0.5,
                radius * qu_over_p.sin() * 0.5,
            )
        };

        let mut vertices = Vec::new();
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * p * TAU;
            let p1 = knot_point(u);
            let p2 = knot_point(u + 0.01);
            let t = p2 - p1;
            let n = p2 + p1;
            let b = t.cross(n).normalize_or_zero();
            let n = b.cross(t).normalize_or_zero();
            for j in 0..=radial_segments {
                let v = j as f32 / radial_segments as f32 * TAU;
                let cx = -tube * v.cos();
                let cy = tube * v.sin();
                let position = p1 + n * cx + b * cy;
                let normal = (position - p1).normalize_or_zero();
                let uv = Vec2::new(i as f32 / tubular_segments as f32, j as f32 / radial_segments as f32);
                vertices.push(MeshVertex::new(position, normal, uv));
            }
        }

        let stride = radial_segments + 1;
        let mut indices = Vec::new();
        for j in 1..=tubular_segments {
            for i in 1..=radial_segments {
                let a = stride * (j - 1) + (i - 1);
                let b = stride * j + (i - 1);
                let c = stride * j + i;
                let d = stride * (j - 1) + i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        Self::new(vertices, indices)
    }

    pub fn tetrahedron(radius: f32) -> Self {
        let corners = [
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
        ];
        let faces = [2, 1, 0, 0, 3, 2, 1, 3, 0, 2, 3, 1];
        Self::polyhedron(&corners, &faces, radius)
    }

    pub fn octahedron(radius: f32) -> Self {
        let corners = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ];
        let faces = [0, 2, 4, 0, 4, 3, 0, 3, 5, 0, 5, 2, 1, 2, 5, 1, 5, 3, 1, 3, 4, 1, 4, 2];
        Self::polyhedron(&corners, &faces, radius)
    }

    pub fn icosahedron(radius: f32) -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let corners = [
            Vec3::new(-1.0, t, 0.0),
            Vec3::new(1.0, t, 0.0),
            Vec3::new(-1.0, -t, 0.0),
            Vec3::new(1.0, -t, 0.0),
            Vec3::new(0.0, -1.0, t),
            Vec3::new(0.0, 1.0, t),
            Vec3::new(0.0, -1.0, -t),
            Vec3::new(0.0, 1.0, -t),
            Vec3::new(t, 0.0, -1.0),
            Vec3::new(t, 0.0, 1.0),
            Vec3::new(-t, 0.0, -1.0),
            Vec3::new(-t, 0.0, 1.0),
        ];
        let faces = [
            0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8,
            3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
        ];
        Self::polyhedron(&corners, &faces, radius)
    }

    pub fn dodecahedron(radius: f32) -> Self {
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let r = 1.0 / t;
        let corners = [
            // (+-1, +-1, +-1)
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            // (0, +-1/t, +-t)
            Vec3::new(0.0, -r, -t),
            Vec3::new(0.0, -r, t),
            Vec3::new(0.0, r, -t),
            Vec3::new(0.0, r, t),
            // (+-1/t, +-t, 0)
            Vec3::new(-r, -t, 0.0),
            Vec3::new(-r, t, 0.0),
            Vec3::new(r, -t, 0.0),
            Vec3::new(r, t, 0.0),
            // (+-t, 0, +-1/t)
            Vec3::new(-t, 0.0, -r),
            Vec3::new(t, 0.0, -r),
            Vec3::new(-t, 0.0, r),
            Vec3::new(t, 0.0, r),
        ];
        let faces = [
            3, 11, 7, 3, 7, 15, 3, 15, 13, 7, 19, 17, 7, 17, 6, 7, 6, 15, 17, 4, 8, 17, 8, 10, 17, 10, 6, 8, 0,
            16, 8, 16, 2, 8, 2, 10, 0, 12, 1, 0, 1, 18, 0, 18, 16, 6, 10, 2, 6, 2, 13, 6, 13, 15, 2, 16, 18, 2,
            18, 3, 2, 3, 13, 18, 1, 9, 18, 9, 11, 18, 11, 3, 4, 14, 12, 4, 12, 0, 4, 0, 8, 11, 9, 5, 11, 5, 19,
            11, 19, 7, 19, 5, 14, 19, 14, 4, 19, 4, 17, 1, 12, 14, 1, 14, 5, 1, 5, 9,
        ];
        Self::polyhedron(&corners, &faces, radius)
    }

    /// Flat-shaded convex solid: corners are projected onto the sphere of `radius`
    /// and every face gets its own outward-facing vertices.
    fn polyhedron(corners: &[Vec3], faces: &[u32], radius: f32) -> Self {
        let mut vertices = Vec::with_capacity(faces.len());
        for tri in faces.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| corners[i as usize].normalize() * radius);
            let centroid = (a + b + c) / 3.0;
            let mut normal = (b - a).cross(c - a).normalize_or_zero();
            let ordered = if normal.dot(centroid) < 0.0 {
                normal = -normal;
                [a, c, b]
            } else {
                [a, b, c]
            };
            for position in ordered {
                vertices.push(MeshVertex::new(position, normal, spherical_uv(position)));
            }
        }
        let indices = (0..vertices.len() as u32).collect();
        Self::new(vertices, indices)
    }
}

fn push_cap(
    vertices: &mut Vec<MeshVertex>,
    indices: &mut Vec<u32>,
    radius: f32,
    half_height: f32,
    radial_segments: u32,
    top: bool,
) {
    let sign = if top { 1.0 } else { -1.0 };
    let normal = Vec3::new(0.0, sign, 0.0);
    let center_start = vertices.len() as u32;
    for _ in 1..=radial_segments {
        vertices.push(MeshVertex::new(Vec3::new(0.0, half_height * sign, 0.0), normal, Vec2::splat(0.5)));
    }
    let rim_start = vertices.len() as u32;
    for x in 0..=radial_segments {
        let theta = x as f32 / radial_segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        let position = Vec3::new(radius * sin, half_height * sign, radius * cos);
        let uv = Vec2::new(cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5);
        vertices.push(MeshVertex::new(position, normal, uv));
    }
    for x in 0..radial_segments {
        let c = center_start + x;
        let i = rim_start + x;
        if top {
            indices.extend_from_slice(&[i, i + 1, c]);
        } else {
            indices.extend_from_slice(&[i + 1, i, c]);
        }
    }
}

fn lathe_profile_normals(profile: &[Vec2]) -> Vec<Vec2> {
    let segment_normal = |a: Vec2, b: Vec2| {
        let d = b - a;
        Vec2::new(d.y, -d.x)
    };
    let mut normals = Vec::with_capacity(profile.len());
    let mut prev = segment_normal(profile[0], profile[1]);
    normals.push(prev.normalize_or_zero());
    for j in 1..profile.len() {
        if j == profile.len() - 1 {
            normals.push(prev.normalize_or_zero());
        } else {
            let current = segment_normal(profile[j], profile[j + 1]);
            normals.push((current + prev).normalize_or_zero());
            prev = current;
        }
    }
    normals
}

fn spherical_uv(position: Vec3) -> Vec2 {
    let azimuth = position.z.atan2(-position.x);
    let inclination = (-position.y).atan2((position.x * position.x + position.z * position.z).sqrt());
    Vec2::new(azimuth / TAU + 0.5, inclination / PI + 0.5)
}

impl MeshBounds {
    pub fn from_vertices(vertices: &[MeshVertex]) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for vertex in vertices {
            let pos = Vec3::from_array(vertex.position);
            min = min.min(pos);
            max = max.max(pos);
        }
        if vertices.is_empty() {
            return MeshBounds { min: Vec3::ZERO, max: Vec3::ZERO, center: Vec3::ZERO, radius: 0.0 };
        }
        let center = (min + max) * 0.5;
        let mut radius: f32 = 0.0;
        for vertex in vertices {
            let pos = Vec3::from_array(vertex.position);
            radius = radius.max((pos - center).length());
        }
        MeshBounds { min, max, center, radius }
    }
}
