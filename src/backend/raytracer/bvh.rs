//! Bounding volume hierarchy over triangles

use crate::math::Vector3;
use crate::scene::Ray;

const LEAF_SIZE: usize = 4;
const EPSILON: f32 = 1e-8;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3,
    pub max: Vector3,
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    pub fn grow(&mut self, p: Vector3) {
        self.min = Vector3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Vector3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn of_triangle(triangle: &[Vector3; 3]) -> Self {
        let mut bounds = Self::EMPTY;
        triangle.iter().for_each(|&p| bounds.grow(p));
        bounds
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut bounds = *self;
        bounds.grow(other.min);
        bounds.grow(other.max);
        bounds
    }

    pub fn extent(&self) -> Vector3 {
        self.max - self.min
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z)
    pub fn longest_axis(&self) -> usize {
        let e = self.extent();
        if e.x >= e.y && e.x >= e.z {
            0
        } else if e.y >= e.z {
            1
        } else {
            2
        }
    }

    /// Slab test against `[0, t_max]`
    pub fn hit(&self, ray: &Ray, inv_dir: Vector3, t_max: f32) -> bool {
        let t1 = (self.min - ray.origin).mul_elem(inv_dir);
        let t2 = (self.max - ray.origin).mul_elem(inv_dir);

        let t_near = t1.x.min(t2.x).max(t1.y.min(t2.y)).max(t1.z.min(t2.z));
        let t_far = t1.x.max(t2.x).min(t1.y.max(t2.y)).min(t1.z.max(t2.z));

        t_far >= t_near.max(0.0) && t_near <= t_max
    }
}

fn axis(v: Vector3, axis: usize) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

/// Closest intersection found by [`Bvh::intersect`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub t: f32,
    /// Barycentric weight of the second vertex
    pub u: f32,
    /// Barycentric weight of the third vertex
    pub v: f32,
    pub triangle: u32,
}

/// Möller–Trumbore ray/triangle test, both faces, returns `(t, u, v)`
pub fn intersect_triangle(ray: &Ray, triangle: &[Vector3; 3]) -> Option<(f32, f32, f32)> {
    let [a, b, c] = *triangle;
    let edge1 = b - a;
    let edge2 = c - a;
    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / det;
    let s = ray.origin - a;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some((t, u, v))
}

#[derive(Debug, Clone, Copy)]
struct Node {
    bounds: Aabb,
    /// First primitive for leaves, right child for interior nodes
    offset: u32,
    /// Primitive count, zero for interior nodes
    count: u32,
}

/// Flattened BVH; the left child of an interior node directly follows it
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<Node>,
    indices: Vec<u32>,
}

impl Bvh {
    pub fn build(triangles: &[[Vector3; 3]]) -> Self {
        let mut bvh = Self {
            nodes: Vec::with_capacity(triangles.len() * 2),
            indices: (0..triangles.len() as u32).collect(),
        };
        if triangles.is_empty() {
            return bvh;
        }

        let bounds: Vec<Aabb> = triangles.iter().map(Aabb::of_triangle).collect();
        let centroids: Vec<Vector3> = triangles
            .iter()
            .map(|[a, b, c]| (*a + *b + *c) / 3.0)
            .collect();
        bvh.build_node(&bounds, &centroids, 0, triangles.len());
        bvh
    }

    fn build_node(&mut self, bounds: &[Aabb], centroids: &[Vector3], start: usize, end: usize) -> u32 {
        let node_bounds = self.indices[start..end]
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| acc.union(&bounds[i as usize]));
        let mut centroid_bounds = Aabb::EMPTY;
        for &i in &self.indices[start..end] {
            centroid_bounds.grow(centroids[i as usize]);
        }

        let index = self.nodes.len() as u32;
        let count = end - start;
        self.nodes.push(Node {
            bounds: node_bounds,
            offset: start as u32,
            count: count as u32,
        });

        let split_axis = centroid_bounds.longest_axis();
        if count <= LEAF_SIZE || axis(centroid_bounds.extent(), split_axis) <= 0.0 {
            return index;
        }

        let mid = start + count / 2;
        self.indices[start..end].select_nth_unstable_by(mid - start, |&a, &b| {
            axis(centroids[a as usize], split_axis).total_cmp(&axis(centroids[b as usize], split_axis))
        });

        self.build_node(bounds, centroids, start, mid);
        let right = self.build_node(bounds, centroids, mid, end);
        let node = &mut self.nodes[index as usize];
        node.offset = right;
        node.count = 0;
        index
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.nodes.first().map(|n| n.bounds)
    }

    /// Closest hit in `(0, t_max]`
    pub fn intersect(&self, triangles: &[[Vector3; 3]], ray: &Ray, t_max: f32) -> Option<Hit> {
        if self.nodes.is_empty() {
            return None;
        }

        let inv_dir = Vector3::new(1.0 / ray.direction.x, 1.0 / ray.direction.y, 1.0 / ray.direction.z);
        let mut closest: Option<Hit> = None;
        let mut t_limit = t_max;
        let mut stack = vec![0u32];

        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index as usize];
            if !node.bounds.hit(ray, inv_dir, t_limit) {
                continue;
            }

            if node.count == 0 {
                stack.push(node.offset);
                stack.push(node_index + 1);
                continue;
            }

            let first = node.offset as usize;
            for &triangle in &self.indices[first..first + node.count as usize] {
                if let Some((t, u, v)) = intersect_triangle(ray, &triangles[triangle as usize]) {
                    if t < t_limit {
                        t_limit = t;
                        closest = Some(Hit { t, u, v, triangle });
                    }
                }
            }
        }
        closest
    }
}
