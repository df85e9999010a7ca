//! Minimal scene container receiving imported buffers.
//!
//! Nodes own named children and named data buffers. Adding a buffer whose
//! name already exists under a node replaces the old one.

use crate::core::stream::Sphere;

/// Payload of a named buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferData {
    Spheres(Vec<Sphere>),
    Colors(Vec<[f32; 4]>),
}

impl BufferData {
    pub fn len(&self) -> usize {
        match self {
            BufferData::Spheres(v) => v.len(),
            BufferData::Colors(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A data buffer carrying its own name.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBuffer {
    name: String,
    data: BufferData,
}

impl DataBuffer {
    pub fn new(name: impl Into<String>, data: BufferData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &BufferData {
        &self.data
    }
}

/// A scene graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    type_tag: String,
    children: Vec<Node>,
    buffers: Vec<DataBuffer>,
}

impl Node {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: type_tag.into(),
            children: Vec::new(),
            buffers: Vec::new(),
        }
    }

    /// Root node of a world.
    pub fn world() -> Self {
        Self::new("world", "Node")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Returns the child called `name`, creating it with `type_tag` if absent.
    ///
    /// An existing child keeps its original type tag.
    pub fn create_child(&mut self, name: &str, type_tag: &str) -> &mut Node {
        let index = match self.children.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.children.push(Node::new(name, type_tag));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Attaches `buffer`, replacing any buffer with the same name.
    pub fn add(&mut self, buffer: DataBuffer) {
        match self.buffers.iter_mut().find(|b| b.name == buffer.name) {
            Some(existing) => *existing = buffer,
            None => self.buffers.push(buffer),
        }
    }

    /// Detaches and returns the buffer called `name`.
    pub fn remove(&mut self, name: &str) -> Option<DataBuffer> {
        let index = self.buffers.iter().position(|b| b.name == name)?;
        Some(self.buffers.remove(index))
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn buffer(&self, name: &str) -> Option<&DataBuffer> {
        self.buffers.iter().find(|b| b.name == name)
    }

    pub fn buffers(&self) -> &[DataBuffer] {
        &self.buffers
    }
}
