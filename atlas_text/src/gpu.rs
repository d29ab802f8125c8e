// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seams to the graphics backend: texture uploads and shader uniforms.

use crate::atlas::DirtyRegion;

/// Backend handle of a single channel texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Receives texture uploads.
pub trait TextureSink {
    /// Creates a `width` x `height` single channel texture.
    fn create_texture(&mut self, width: u32, height: u32) -> TextureId;

    /// Uploads `region` of `pixels` (rows of `stride` bytes covering the
    /// whole texture) into `texture`.
    fn upload(&mut self, texture: TextureId, pixels: &[u8], stride: u32, region: DirtyRegion);
}

/// Backend handle of a shader uniform.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UniformHandle(pub u32);

/// A linked shader program.
pub trait ShaderProgram {
    /// Resolves the uniform called `name`.
    fn find_uniform(&mut self, name: &str) -> Option<UniformHandle>;

    /// Sets a float vector uniform.
    fn set_uniform(&mut self, uniform: UniformHandle, value: &[f32]);
}

/// Vertex offset uniform name.
pub const POSITION_OFFSET_UNIFORM: &str = "pos_offset";
/// Text color uniform name.
pub const COLOR_UNIFORM: &str = "color";
/// Clip rectangle uniform name.
pub const CLIPPING_UNIFORM: &str = "clipping";
/// Distance field threshold uniform name.
pub const THRESHOLD_UNIFORM: &str = "threshold";

fn required(uniform: Option<UniformHandle>, name: &str) -> UniformHandle {
    match uniform {
        Some(uniform) => uniform,
        None => panic!("shader has no {name} uniform"),
    }
}

/// A text shader with its uniforms resolved once.
#[derive(Debug)]
pub struct FontShader<S> {
    program: S,
    position_offset: Option<UniformHandle>,
    color: Option<UniformHandle>,
    clipping: Option<UniformHandle>,
    threshold: Option<UniformHandle>,
}

impl<S: ShaderProgram> FontShader<S> {
    /// Wraps `program`, looking up its uniforms.
    pub fn new(mut program: S) -> Self {
        Self {
            position_offset: program.find_uniform(POSITION_OFFSET_UNIFORM),
            color: program.find_uniform(COLOR_UNIFORM),
            clipping: program.find_uniform(CLIPPING_UNIFORM),
            threshold: program.find_uniform(THRESHOLD_UNIFORM),
            program,
        }
    }

    /// Returns `true` if every uniform was found.
    pub fn is_complete(&self) -> bool {
        self.position_offset.is_some()
            && self.color.is_some()
            && self.clipping.is_some()
            && self.threshold.is_some()
    }

    /// The wrapped program.
    pub fn program(&self) -> &S {
        &self.program
    }

    /// Unwraps the program.
    pub fn into_program(self) -> S {
        self.program
    }

    /// Sets the offset added to every vertex position.
    ///
    /// # Panics
    ///
    /// Panics if the program has no `pos_offset` uniform.
    pub fn set_position_offset(&mut self, offset: [f32; 2]) {
        let uniform = required(self.position_offset, POSITION_OFFSET_UNIFORM);
        self.program.set_uniform(uniform, &offset);
    }

    /// Sets the text color.
    ///
    /// # Panics
    ///
    /// Panics if the program has no `color` uniform.
    pub fn set_color(&mut self, color: [f32; 4]) {
        let uniform = required(self.color, COLOR_UNIFORM);
        self.program.set_uniform(uniform, &color);
    }

    /// Sets the clip rectangle `[x0, y0, x1, y1]`.
    ///
    /// # Panics
    ///
    /// Panics if the program has no `clipping` uniform.
    pub fn set_clipping(&mut self, clipping: [f32; 4]) {
        let uniform = required(self.clipping, CLIPPING_UNIFORM);
        self.program.set_uniform(uniform, &clipping);
    }

    /// Sets the distance field edge threshold.
    ///
    /// # Panics
    ///
    /// Panics if the program has no `threshold` uniform.
    pub fn set_threshold(&mut self, threshold: f32) {
        let uniform = required(self.threshold, THRESHOLD_UNIFORM);
        self.program.set_uniform(uniform, &[threshold]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockShader;

    #[test]
    fn uniforms_are_resolved_once() {
        let program = MockShader::new(&[COLOR_UNIFORM, POSITION_OFFSET_UNIFORM, THRESHOLD_UNIFORM]);
        let mut shader = FontShader::new(program);
        assert!(!shader.is_complete());
        shader.set_position_offset([1.0, 2.0]);
        shader.set_threshold(0.5);
        let values = &shader.program().values;
        assert_eq!(values[0], (UniformHandle(1), alloc::vec![1.0, 2.0]));
        assert_eq!(values[1], (UniformHandle(2), alloc::vec![0.5]));
    }

    #[test]
    #[should_panic(expected = "shader has no clipping uniform")]
    fn missing_uniform_panics_on_set() {
        let mut shader = FontShader::new(MockShader::new(&[COLOR_UNIFORM]));
        shader.set_clipping([0.0, 0.0, 10.0, 10.0]);
    }
}
