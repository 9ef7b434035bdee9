use crate::obj::{Obj, ObjKind};

/// One nesting level of declarations. Insertion order is declaration order,
/// which is what numbers the variable slots.
#[derive(Debug, Default)]
pub struct Scope {
    locals: Vec<Obj>,
}

impl Scope {
    pub fn find(&self, name: &str) -> Option<&Obj> {
        self.locals.iter().find(|obj| obj.name == name)
    }

    pub fn insert(&mut self, obj: Obj) -> usize {
        self.locals.push(obj);
        self.locals.len() - 1
    }

    /// Number of variable slots allocated in this scope.
    pub fn n_vars(&self) -> usize {
        self.locals
            .iter()
            .filter(|obj| obj.kind == ObjKind::Var)
            .count()
    }

    pub fn locals(&self) -> &[Obj] {
        &self.locals
    }

    pub fn locals_mut(&mut self) -> &mut [Obj] {
        &mut self.locals
    }

    pub fn into_locals(self) -> Vec<Obj> {
        self.locals
    }
}
