pub mod obj;
pub mod scope;
pub mod types;

use obj::{Builtin, Obj, ObjKind};
use scope::Scope;
use types::{ClassId, Type};

use mjc_errors::Message;

/// Handle to a symbol in a currently open scope. Stays valid as long as the
/// scope it points into has not been closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjHandle {
    scope: usize,
    index: usize,
}

impl ObjHandle {
    /// Handle of the sentinel object. Reads and writes through it go to a
    /// dummy slot, so analysis after a declaration error is a no-op.
    pub const NONE: ObjHandle = ObjHandle {
        scope: usize::MAX,
        index: 0,
    };
}

/// Scope-stack symbol table. Construction seeds the universe scope with the
/// primitive types, the `null` constant and the builtin pseudo-methods; the
/// universe stays open for the whole compilation.
pub struct Tab {
    scopes: Vec<Scope>,
    classes: Vec<Vec<Obj>>,
    cur_level: i32,
    no_obj: Obj,
}

impl Tab {
    pub fn new() -> Tab {
        let mut tab = Tab {
            scopes: Vec::new(),
            classes: Vec::new(),
            cur_level: -2,
            no_obj: Obj::no_obj(),
        };

        // universe, level -1
        tab.open_scope();

        tab.seed(ObjKind::Type, "int", Type::Int);
        tab.seed(ObjKind::Type, "char", Type::Char);
        tab.seed(ObjKind::Con, "null", Type::Null);

        tab.seed_builtin(Builtin::Chr, "chr", Type::Char, "i", Type::Int);
        tab.seed_builtin(Builtin::Ord, "ord", Type::Int, "ch", Type::Char);
        tab.seed_builtin(Builtin::Len, "len", Type::Int, "arr", Type::array_of(Type::None));

        tab
    }

    fn seed(&mut self, kind: ObjKind, name: &str, ty: Type) {
        // Universe names are distinct, insertion cannot fail.
        let _ = self.insert(kind, name, ty);
    }

    fn seed_builtin(&mut self, builtin: Builtin, name: &str, ty: Type, par: &str, par_ty: Type) {
        let handle = match self.insert(ObjKind::Meth, name, ty) {
            Ok(handle) => handle,
            Err(_) => return,
        };

        self.open_scope();
        let _ = self.insert(ObjKind::Var, par, par_ty);
        let n_pars = self.cur_scope().n_vars();
        let scope = self.close_scope();

        let obj = self.obj_mut(handle);
        obj.n_pars = n_pars;
        obj.locals = scope.into_locals();
        obj.builtin = Some(builtin);
    }

    pub fn open_scope(&mut self) {
        self.scopes.push(Scope::default());
        self.cur_level += 1;
    }

    /// Pops the innermost scope and hands its declarations to the caller.
    /// Scopes close in strict stack discipline.
    pub fn close_scope(&mut self) -> Scope {
        self.cur_level -= 1;
        self.scopes.pop().expect("scope stack underflow")
    }

    pub fn cur_scope(&self) -> &Scope {
        self.scopes.last().expect("no open scope")
    }

    /// Declares `name` in the innermost scope. Variables get the next free
    /// slot address of that scope and the current nesting level.
    pub fn insert(&mut self, kind: ObjKind, name: &str, ty: Type) -> Result<ObjHandle, Message> {
        let scope_index = self.scopes.len() - 1;
        let scope = &mut self.scopes[scope_index];

        if scope.find(name).is_some() {
            return Err(Message::DeclName(name.to_string()));
        }

        let mut obj = Obj::new(kind, name, ty);
        if kind == ObjKind::Var {
            obj.adr = scope.n_vars() as i32;
            obj.level = self.cur_level;
        }

        let index = scope.insert(obj);

        Ok(ObjHandle {
            scope: scope_index,
            index,
        })
    }

    /// Resolves `name` from the innermost scope outward.
    pub fn find(&self, name: &str) -> Result<Obj, Message> {
        for scope in self.scopes.iter().rev() {
            if let Some(obj) = scope.find(name) {
                return Ok(obj.clone());
            }
        }

        Err(Message::NotFound(name.to_string()))
    }

    /// Resolves `name` among the fields of `ty`. Lookup is flat: only the
    /// class's own field list is searched.
    pub fn find_field(&self, name: &str, ty: &Type) -> Result<Obj, Message> {
        if let Type::Class(ClassId(id)) = ty {
            if let Some(fields) = self.classes.get(*id) {
                if let Some(obj) = fields.iter().find(|obj| obj.name == name) {
                    return Ok(obj.clone());
                }
            }
        }

        Err(Message::NoField(name.to_string()))
    }

    pub fn obj(&self, handle: ObjHandle) -> &Obj {
        match self.scopes.get(handle.scope) {
            Some(scope) => scope.locals().get(handle.index).unwrap_or(&self.no_obj),
            None => &self.no_obj,
        }
    }

    pub fn obj_mut(&mut self, handle: ObjHandle) -> &mut Obj {
        if handle.scope < self.scopes.len() {
            // Handles are only created by insert, the index is in range.
            &mut self.scopes[handle.scope].locals_mut()[handle.index]
        } else {
            &mut self.no_obj
        }
    }

    pub fn new_class(&mut self) -> ClassId {
        self.classes.push(Vec::new());
        ClassId(self.classes.len() - 1)
    }

    pub fn set_class_fields(&mut self, id: ClassId, fields: Vec<Obj>) {
        self.classes[id.0] = fields;
    }

    pub fn class_fields(&self, id: ClassId) -> &[Obj] {
        &self.classes[id.0]
    }
}

impl Default for Tab {
    fn default() -> Tab {
        Tab::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_is_seeded() {
        let tab = Tab::new();

        assert_eq!(tab.find("int").unwrap().kind, ObjKind::Type);
        assert_eq!(tab.find("char").unwrap().ty, Type::Char);
        assert_eq!(tab.find("null").unwrap().ty, Type::Null);

        let chr = tab.find("chr").unwrap();
        assert_eq!(chr.kind, ObjKind::Meth);
        assert_eq!(chr.n_pars, 1);
        assert_eq!(chr.builtin, Some(Builtin::Chr));

        let len = tab.find("len").unwrap();
        assert_eq!(len.ty, Type::Int);
        assert_eq!(len.locals[0].ty, Type::array_of(Type::None));
    }

    #[test]
    fn redeclaration_keeps_first_declaration() {
        let mut tab = Tab::new();
        tab.open_scope();

        tab.insert(ObjKind::Var, "x", Type::Int).unwrap();
        let err = tab.insert(ObjKind::Var, "x", Type::Char).unwrap_err();

        assert_eq!(err, Message::DeclName("x".to_string()));
        assert_eq!(tab.find("x").unwrap().ty, Type::Int);
    }

    #[test]
    fn shadowing_across_scopes_is_legal() {
        let mut tab = Tab::new();
        tab.open_scope();
        tab.insert(ObjKind::Var, "x", Type::Int).unwrap();

        tab.open_scope();
        tab.insert(ObjKind::Var, "x", Type::Char).unwrap();
        assert_eq!(tab.find("x").unwrap().ty, Type::Char);

        tab.close_scope();
        assert_eq!(tab.find("x").unwrap().ty, Type::Int);
    }

    #[test]
    fn only_variables_get_slot_addresses() {
        let mut tab = Tab::new();
        tab.open_scope();

        let a = tab.insert(ObjKind::Var, "a", Type::Int).unwrap();
        tab.insert(ObjKind::Con, "c", Type::Int).unwrap();
        let b = tab.insert(ObjKind::Var, "b", Type::Int).unwrap();

        assert_eq!(tab.obj(a).adr, 0);
        assert_eq!(tab.obj(b).adr, 1);
        assert_eq!(tab.cur_scope().n_vars(), 2);
    }

    #[test]
    fn field_lookup_is_flat() {
        let mut tab = Tab::new();
        let id = tab.new_class();
        tab.set_class_fields(id, vec![Obj::new(ObjKind::Var, "f", Type::Int)]);

        assert_eq!(tab.find_field("f", &Type::Class(id)).unwrap().name, "f");
        assert_eq!(
            tab.find_field("g", &Type::Class(id)).unwrap_err(),
            Message::NoField("g".to_string())
        );
        assert_eq!(
            tab.find_field("f", &Type::Int).unwrap_err(),
            Message::NoField("f".to_string())
        );
    }

    #[test]
    fn sentinel_handle_mutation_is_a_no_op() {
        let mut tab = Tab::new();

        tab.obj_mut(ObjHandle::NONE).val = 17;
        assert_eq!(tab.obj(ObjHandle::NONE).name, "noObj");
    }
}
