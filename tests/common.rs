// Common test utilities
#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

/// Assembles classfile bytes for tests. Pool entries are interned, so
/// asking twice for the same text or class yields the same index.
pub struct ClassBuilder {
    pool: Vec<u8>,
    next_index: u16,
    utf8s: HashMap<String, u16>,
    classes: HashMap<String, u16>,
    flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    inner_classes: Vec<[u16; 4]>,
    attributes: Vec<Vec<u8>>,
}

impl ClassBuilder {
    /// A class extending `java/lang/Object`
    pub fn new(name: &str, flags: u16) -> Self {
        let mut b = Self {
            pool: Vec::new(),
            next_index: 1,
            utf8s: HashMap::new(),
            classes: HashMap::new(),
            flags,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
            attributes: Vec::new(),
        };
        b.this_class = b.class(name);
        b.super_class = b.class("java/lang/Object");
        b
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        if let Some(&index) = self.utf8s.get(text) {
            return index;
        }
        self.pool.push(1);
        self.pool.extend_from_slice(&(text.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(text.as_bytes());
        let index = self.take_slots(1);
        self.utf8s.insert(text.to_string(), index);
        index
    }

    pub fn class(&mut self, name: &str) -> u16 {
        if let Some(&index) = self.classes.get(name) {
            return index;
        }
        let name_index = self.utf8(name);
        self.pool.push(7);
        self.pool.extend_from_slice(&name_index.to_be_bytes());
        let index = self.take_slots(1);
        self.classes.insert(name.to_string(), index);
        index
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.pool.push(3);
        self.pool.extend_from_slice(&value.to_be_bytes());
        self.take_slots(1)
    }

    pub fn long(&mut self, value: i64) -> u16 {
        self.pool.push(5);
        self.pool.extend_from_slice(&value.to_be_bytes());
        self.take_slots(2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        self.pool.push(6);
        self.pool.extend_from_slice(&value.to_be_bytes());
        self.take_slots(2)
    }

    pub fn string(&mut self, text: &str) -> u16 {
        let text_index = self.utf8(text);
        self.pool.push(8);
        self.pool.extend_from_slice(&text_index.to_be_bytes());
        self.take_slots(1)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let owner_index = self.class(owner);
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.pool.push(12);
        self.pool.extend_from_slice(&name_index.to_be_bytes());
        self.pool.extend_from_slice(&descriptor_index.to_be_bytes());
        let nat = self.take_slots(1);
        self.pool.push(10);
        self.pool.extend_from_slice(&owner_index.to_be_bytes());
        self.pool.extend_from_slice(&nat.to_be_bytes());
        self.take_slots(1)
    }

    fn take_slots(&mut self, slots: u16) -> u16 {
        let index = self.next_index;
        self.next_index += slots;
        index
    }

    pub fn superclass(&mut self, name: &str) -> &mut Self {
        self.super_class = self.class(name);
        self
    }

    pub fn no_superclass(&mut self) -> &mut Self {
        self.super_class = 0;
        self
    }

    pub fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    pub fn field(&mut self, flags: u16, name: &str, descriptor: &str) -> &mut Self {
        self.field_with(flags, name, descriptor, Vec::new())
    }

    pub fn field_with(&mut self, flags: u16, name: &str, descriptor: &str, attributes: Vec<(&str, Vec<u8>)>) -> &mut Self {
        let member = self.member(flags, name, descriptor, attributes);
        self.fields.push(member);
        self
    }

    pub fn method(&mut self, flags: u16, name: &str, descriptor: &str) -> &mut Self {
        self.method_with(flags, name, descriptor, Vec::new())
    }

    pub fn method_with(&mut self, flags: u16, name: &str, descriptor: &str, attributes: Vec<(&str, Vec<u8>)>) -> &mut Self {
        let member = self.member(flags, name, descriptor, attributes);
        self.methods.push(member);
        self
    }

    fn member(&mut self, flags: u16, name: &str, descriptor: &str, attributes: Vec<(&str, Vec<u8>)>) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&flags.to_be_bytes());
        out.extend_from_slice(&self.utf8(name).to_be_bytes());
        out.extend_from_slice(&self.utf8(descriptor).to_be_bytes());
        out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for (attribute_name, body) in attributes {
            let encoded = self.attribute(attribute_name, &body);
            out.extend_from_slice(&encoded);
        }
        out
    }

    fn attribute(&mut self, name: &str, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.utf8(name).to_be_bytes());
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(body);
        out
    }

    /// Add an `InnerClasses` entry; `None` encodes index 0
    pub fn inner_class(&mut self, inner: Option<&str>, outer: Option<&str>, flags: u16) -> &mut Self {
        let inner_index = inner.map_or(0, |name| self.class(name));
        let outer_index = outer.map_or(0, |name| self.class(name));
        self.inner_classes.push([inner_index, outer_index, 0, flags]);
        self
    }

    pub fn signature(&mut self, signature: &str) -> &mut Self {
        let index = self.utf8(signature);
        self.class_attribute("Signature", index.to_be_bytes().to_vec())
    }

    pub fn class_attribute(&mut self, name: &str, body: Vec<u8>) -> &mut Self {
        let encoded = self.attribute(name, &body);
        self.attributes.push(encoded);
        self
    }

    /// `RuntimeVisibleAnnotations` body holding one annotation with
    /// integer elements
    pub fn annotation_body(&mut self, type_descriptor: &str, elements: &[(&str, i32)]) -> Vec<u8> {
        let mut body = 1u16.to_be_bytes().to_vec();
        body.extend_from_slice(&self.utf8(type_descriptor).to_be_bytes());
        body.extend_from_slice(&(elements.len() as u16).to_be_bytes());
        for (name, value) in elements {
            body.extend_from_slice(&self.utf8(name).to_be_bytes());
            body.push(b'I');
            body.extend_from_slice(&self.integer(*value).to_be_bytes());
        }
        body
    }

    pub fn build(&mut self) -> Vec<u8> {
        if !self.inner_classes.is_empty() {
            let mut body = (self.inner_classes.len() as u16).to_be_bytes().to_vec();
            for entry in &self.inner_classes {
                for value in entry {
                    body.extend_from_slice(&value.to_be_bytes());
                }
            }
            let encoded = self.attribute("InnerClasses", &body);
            self.attributes.push(encoded);
            self.inner_classes.clear();
        }

        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        out.extend_from_slice(&self.next_index.to_be_bytes());
        out.extend_from_slice(&self.pool);
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for index in &self.interfaces {
            out.extend_from_slice(&index.to_be_bytes());
        }
        for members in [&self.fields, &self.methods] {
            out.extend_from_slice(&(members.len() as u16).to_be_bytes());
            for member in members {
                out.extend_from_slice(member);
            }
        }
        out.extend_from_slice(&(self.attributes.len() as u16).to_be_bytes());
        for attribute in &self.attributes {
            out.extend_from_slice(attribute);
        }
        out
    }
}

/// Write a classfile under `root` at the path its internal name implies
pub fn write_class(root: &Path, name: &str, bytes: &[u8]) {
    let path = root.join(format!("{}.class", name));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}
