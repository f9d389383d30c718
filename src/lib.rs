pub mod changes;
pub mod element;
pub mod error;
pub mod handle;
pub mod identity;
pub mod mesh;
pub mod molecule;
pub mod store;
pub mod topology;
pub mod traits;
pub mod variant;

pub use changes::{ChangeSink, MoleculeChanges};
pub use error::{ElementKind, GraphError};
pub use handle::{Atom, Bond, MoleculeId, UniqueId};
pub use identity::IdentityTable;
pub use mesh::{Color3f, Mesh};
pub use molecule::Molecule;
pub use store::{AtomData, BondData, GraphStore};
pub use traits::{
    HasAtomicNum, HasBondOrder, HasFormalCharge, HasPosition2D, HasPosition3D, HasSelection,
};
pub use variant::{DataMap, Variant};
