//! Fragment-program descriptors for the built-in post-processing passes.
//!
//! Each descriptor pairs GLSL vertex+fragment source with a named-uniform
//! schema and its default values. Pass constructors hand these to
//! [`crate::Rasterizer::compile_program`]; per-instance overrides live on the
//! pass, not here.

use crate::raster::{UniformMap, UniformValue};

/// A compilable shader: sources, preprocessor defines, and uniform defaults.
#[derive(Clone, Debug)]
pub struct ShaderDescriptor {
    pub name: &'static str,
    pub defines: Vec<(String, String)>,
    pub uniforms: UniformMap,
    pub vertex_source: &'static str,
    pub fragment_source: &'static str,
}

/// The sampler uniform a pass binds its chain input to unless configured
/// otherwise.
pub const INPUT_TEXTURE: &str = "tDiffuse";

const QUAD_VERTEX: &str = r#"
varying vec2 vUv;
void main() {
    vUv = uv;
    gl_Position = projectionMatrix * modelViewMatrix * vec4( position, 1.0 );
}
"#;

fn uniforms(entries: &[(&str, UniformValue)]) -> UniformMap {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// Full-screen textured quad, scaled by `opacity`.
pub fn copy() -> ShaderDescriptor {
    ShaderDescriptor {
        name: "copy",
        defines: Vec::new(),
        uniforms: uniforms(&[
            (INPUT_TEXTURE, UniformValue::Texture(None)),
            ("opacity", UniformValue::Float(1.0)),
        ]),
        vertex_source: QUAD_VERTEX,
        fragment_source: r#"
uniform float opacity;
uniform sampler2D tDiffuse;
varying vec2 vUv;
void main() {
    vec4 texel = texture2D( tDiffuse, vUv );
    gl_FragColor = opacity * texel;
}
"#,
    }
}

/// Mix of two textures by `mixRatio`, scaled by `opacity`. Pairs with a save
/// pass for frame-to-frame trail effects.
pub fn blend() -> ShaderDescriptor {
    ShaderDescriptor {
        name: "blend",
        defines: Vec::new(),
        uniforms: uniforms(&[
            ("tDiffuse1", UniformValue::Texture(None)),
            ("tDiffuse2", UniformValue::Texture(None)),
            ("mixRatio", UniformValue::Float(0.5)),
            ("opacity", UniformValue::Float(1.0)),
        ]),
        vertex_source: QUAD_VERTEX,
        fragment_source: r#"
uniform float opacity;
uniform float mixRatio;
uniform sampler2D tDiffuse1;
uniform sampler2D tDiffuse2;
varying vec2 vUv;
void main() {
    vec4 texel1 = texture2D( tDiffuse1, vUv );
    vec4 texel2 = texture2D( tDiffuse2, vUv );
    gl_FragColor = opacity * mix( texel1, texel2, mixRatio );
}
"#,
    }
}

/// One dimension of a separable convolution. `uImageIncrement` selects the
/// blur axis; the kernel itself arrives through the `cKernel` uniform array.
pub fn convolution(kernel_size: usize) -> ShaderDescriptor {
    ShaderDescriptor {
        name: "convolution",
        defines: vec![
            ("KERNEL_SIZE_FLOAT".to_string(), format!("{kernel_size}.0")),
            ("KERNEL_SIZE_INT".to_string(), kernel_size.to_string()),
        ],
        uniforms: uniforms(&[
            (INPUT_TEXTURE, UniformValue::Texture(None)),
            ("uImageIncrement", UniformValue::Vec2([0.001953125, 0.0])),
            ("cKernel", UniformValue::FloatArray(Vec::new())),
        ]),
        vertex_source: r#"
uniform vec2 uImageIncrement;
varying vec2 vUv;
void main() {
    vUv = uv - ( ( KERNEL_SIZE_FLOAT - 1.0 ) / 2.0 ) * uImageIncrement;
    gl_Position = projectionMatrix * modelViewMatrix * vec4( position, 1.0 );
}
"#,
        fragment_source: r#"
uniform float cKernel[ KERNEL_SIZE_INT ];
uniform sampler2D tDiffuse;
uniform vec2 uImageIncrement;
varying vec2 vUv;
void main() {
    vec2 imageCoord = vUv;
    vec4 sum = vec4( 0.0, 0.0, 0.0, 0.0 );
    for( int i = 0; i < KERNEL_SIZE_INT; i ++ ) {
        sum += texture2D( tDiffuse, imageCoord ) * cKernel[ i ];
        imageCoord += uImageIncrement;
    }
    gl_FragColor = sum;
}
"#,
    }
}

/// Luma-gradient antialiasing over a 3x3 neighborhood.
///
/// `resolution` must hold `(1/width, 1/height)` of the sampled buffer and has
/// to be re-set by the caller whenever the chain resizes.
pub fn fxaa() -> ShaderDescriptor {
    ShaderDescriptor {
        name: "fxaa",
        defines: Vec::new(),
        uniforms: uniforms(&[
            (INPUT_TEXTURE, UniformValue::Texture(None)),
            ("resolution", UniformValue::Vec2([1.0 / 1024.0, 1.0 / 512.0])),
        ]),
        vertex_source: r#"
void main() {
    gl_Position = projectionMatrix * modelViewMatrix * vec4( position, 1.0 );
}
"#,
        fragment_source: r#"
uniform sampler2D tDiffuse;
uniform vec2 resolution;
#define FXAA_REDUCE_MIN   (1.0/128.0)
#define FXAA_REDUCE_MUL   (1.0/8.0)
#define FXAA_SPAN_MAX     8.0
void main() {
    vec3 rgbNW = texture2D( tDiffuse, ( gl_FragCoord.xy + vec2( -1.0, -1.0 ) ) * resolution ).xyz;
    vec3 rgbNE = texture2D( tDiffuse, ( gl_FragCoord.xy + vec2( 1.0, -1.0 ) ) * resolution ).xyz;
    vec3 rgbSW = texture2D( tDiffuse, ( gl_FragCoord.xy + vec2( -1.0, 1.0 ) ) * resolution ).xyz;
    vec3 rgbSE = texture2D( tDiffuse, ( gl_FragCoord.xy + vec2( 1.0, 1.0 ) ) * resolution ).xyz;
    vec4 rgbaM  = texture2D( tDiffuse,  gl_FragCoord.xy  * resolution );
    vec3 rgbM  = rgbaM.xyz;
    vec3 luma = vec3( 0.299, 0.587, 0.114 );
    float lumaNW = dot( rgbNW, luma );
    float lumaNE = dot( rgbNE, luma );
    float lumaSW = dot( rgbSW, luma );
    float lumaSE = dot( rgbSE, luma );
    float lumaM  = dot( rgbM,  luma );
    float lumaMin = min( lumaM, min( min( lumaNW, lumaNE ), min( lumaSW, lumaSE ) ) );
    float lumaMax = max( lumaM, max( max( lumaNW, lumaNE) , max( lumaSW, lumaSE ) ) );
    vec2 dir;
    dir.x = -((lumaNW + lumaNE) - (lumaSW + lumaSE));
    dir.y =  ((lumaNW + lumaSW) - (lumaNE + lumaSE));
    float dirReduce = max( ( lumaNW + lumaNE + lumaSW + lumaSE ) * ( 0.25 * FXAA_REDUCE_MUL ), FXAA_REDUCE_MIN );
    float rcpDirMin = 1.0 / ( min( abs( dir.x ), abs( dir.y ) ) + dirReduce );
    dir = min( vec2( FXAA_SPAN_MAX,  FXAA_SPAN_MAX),
          max( vec2(-FXAA_SPAN_MAX, -FXAA_SPAN_MAX),
                dir * rcpDirMin)) * resolution;
    vec4 rgbA = (1.0/2.0) * (
        texture2D(tDiffuse,  gl_FragCoord.xy  * resolution + dir * (1.0/3.0 - 0.5)) +
        texture2D(tDiffuse,  gl_FragCoord.xy  * resolution + dir * (2.0/3.0 - 0.5)));
    vec4 rgbB = rgbA * (1.0/2.0) + (1.0/4.0) * (
        texture2D(tDiffuse,  gl_FragCoord.xy  * resolution + dir * (0.0/3.0 - 0.5)) +
        texture2D(tDiffuse,  gl_FragCoord.xy  * resolution + dir * (3.0/3.0 - 0.5)));
    float lumaB = dot(rgbB, vec4(luma, 0.0));
    if ( ( lumaB < lumaMin ) || ( lumaB > lumaMax ) ) {
        gl_FragColor = rgbA;
    } else {
        gl_FragColor = rgbB;
    }
}
"#,
    }
}

/// Radial darkening toward the frame edges.
pub fn vignette() -> ShaderDescriptor {
    ShaderDescriptor {
        name: "vignette",
        defines: Vec::new(),
        uniforms: uniforms(&[
            (INPUT_TEXTURE, UniformValue::Texture(None)),
            ("offset", UniformValue::Float(1.0)),
            ("darkness", UniformValue::Float(1.0)),
        ]),
        vertex_source: QUAD_VERTEX,
        fragment_source: r#"
uniform float offset;
uniform float darkness;
uniform sampler2D tDiffuse;
varying vec2 vUv;
void main() {
    vec4 texel = texture2D( tDiffuse, vUv );
    vec2 uv = ( vUv - vec2( 0.5 ) ) * vec2( offset );
    gl_FragColor = vec4( mix( texel.rgb, vec3( 1.0 - darkness ), dot( uv, uv ) ), texel.a );
}
"#,
    }
}

/// Luminance-based contrast remap, blended over the source by `opacity`.
pub fn bleach_bypass() -> ShaderDescriptor {
    ShaderDescriptor {
        name: "bleach_bypass",
        defines: Vec::new(),
        uniforms: uniforms(&[
            (INPUT_TEXTURE, UniformValue::Texture(None)),
            ("opacity", UniformValue::Float(1.0)),
        ]),
        vertex_source: QUAD_VERTEX,
        fragment_source: r#"
uniform float opacity;
uniform sampler2D tDiffuse;
varying vec2 vUv;
void main() {
    vec4 base = texture2D( tDiffuse, vUv );
    vec3 lumCoeff = vec3( 0.25, 0.65, 0.1 );
    float lum = dot( lumCoeff, base.rgb );
    vec3 blend = vec3( lum );
    float L = min( 1.0, max( 0.0, 10.0 * ( lum - 0.45 ) ) );
    vec3 result1 = 2.0 * base.rgb * blend;
    vec3 result2 = 1.0 - 2.0 * ( 1.0 - blend ) * ( 1.0 - base.rgb );
    vec3 newColor = mix( result1, result2, L );
    float A2 = opacity * base.a;
    vec3 mixRGB = A2 * newColor.rgb;
    mixRGB += ( ( 1.0 - A2 ) * base.rgb );
    gl_FragColor = vec4( mixRGB, base.a );
}
"#,
    }
}
