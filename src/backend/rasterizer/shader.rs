//! WGSL source for the scene pipeline

/// Vertex inputs follow `StagedVertex::layout()`; lighting is a headlight in view space
pub const SCENE_SHADER: &str = r#"
struct FrameUniforms {
    mvp: mat4x4<f32>,
    model_view: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
};

struct Material {
    diffuse: vec4<f32>,
    ambient: vec4<f32>,
    specular: vec4<f32>,
    texture_index: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
};

@group(0) @binding(0) var<uniform> frame: FrameUniforms;
@group(0) @binding(1) var<storage, read> materials: array<Material>;
@group(0) @binding(2) var diffuse_sampler: sampler;
@group(1) @binding(0) var diffuse_texture: texture_2d<f32>;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
    @location(3) uv: vec2<f32>,
    @location(4) ambient: vec3<f32>,
    @location(5) specular: vec3<f32>,
    @location(6) material_index: u32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_position: vec3<f32>,
    @location(1) view_normal: vec3<f32>,
    @location(2) color: vec3<f32>,
    @location(3) uv: vec2<f32>,
    @location(4) ambient: vec3<f32>,
    @location(5) specular: vec3<f32>,
    @location(6) @interpolate(flat) material_index: u32,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let position = vec4<f32>(in.position, 1.0);
    out.clip_position = frame.mvp * position;
    out.view_position = (frame.model_view * position).xyz;
    out.view_normal = (frame.normal_matrix * vec4<f32>(in.normal, 0.0)).xyz;
    out.color = in.color;
    out.uv = in.uv;
    out.ambient = in.ambient;
    out.specular = in.specular;
    out.material_index = in.material_index;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let material = materials[in.material_index];
    let texel = textureSample(diffuse_texture, diffuse_sampler, in.uv);

    // Light and viewer coincide at the eye
    let to_eye = normalize(-in.view_position);
    var n = normalize(in.view_normal);
    if (dot(n, to_eye) < 0.0) {
        n = -n;
    }
    let n_dot_l = max(dot(n, to_eye), 0.0);
    let specular = pow(n_dot_l, max(material.specular.w, 1.0));

    let base = material.diffuse.rgb * texel.rgb * in.color;
    let rgb = in.ambient * texel.rgb
        + base * n_dot_l
        + in.specular * specular;
    return vec4<f32>(rgb, material.diffuse.a * texel.a);
}
"#;
