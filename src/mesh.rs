//! Derived surface geometry attached to a molecule.
//!
//! Meshes are computed artifacts (isosurfaces, orbitals) stored alongside
//! the atoms. They carry no atom or bond references and are never rebuilt
//! or dropped by structural edits; whoever computed a mesh replaces it.

/// RGB color with `f32` channels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color3f {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color3f {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    name: String,
    vertices: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    colors: Vec<Color3f>,
    iso_value: f32,
    other_mesh: usize,
    stable: bool,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            vertices: Vec::new(),
            normals: Vec::new(),
            colors: Vec::new(),
            iso_value: 0.0,
            other_mesh: 0,
            stable: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    pub fn set_vertices(&mut self, vertices: Vec<[f32; 3]>) {
        self.vertices = vertices;
    }

    pub fn add_vertices(&mut self, vertices: &[[f32; 3]]) {
        self.vertices.extend_from_slice(vertices);
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn set_normals(&mut self, normals: Vec<[f32; 3]>) {
        self.normals = normals;
    }

    pub fn add_normals(&mut self, normals: &[[f32; 3]]) {
        self.normals.extend_from_slice(normals);
    }

    pub fn colors(&self) -> &[Color3f] {
        &self.colors
    }

    pub fn set_colors(&mut self, colors: Vec<Color3f>) {
        self.colors = colors;
    }

    pub fn add_colors(&mut self, colors: &[Color3f]) {
        self.colors.extend_from_slice(colors);
    }

    /// Scalar field value this surface was extracted at.
    pub fn iso_value(&self) -> f32 {
        self.iso_value
    }

    pub fn set_iso_value(&mut self, value: f32) {
        self.iso_value = value;
    }

    /// Index of a paired mesh (e.g. the negative lobe of an orbital).
    pub fn other_mesh(&self) -> usize {
        self.other_mesh
    }

    pub fn set_other_mesh(&mut self, index: usize) {
        self.other_mesh = index;
    }

    /// `false` while the mesh is still being generated.
    pub fn is_stable(&self) -> bool {
        self.stable
    }

    pub fn set_stable(&mut self, stable: bool) {
        self.stable = stable;
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.colors.clear();
    }
}
