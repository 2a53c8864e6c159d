//! Python-facing surface: a [`SimLog`] class wrapping the parsed model,
//! returning NumPy arrays shaped for plotting.

use std::path::PathBuf;

use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::exceptions::{PyIndexError, PyKeyError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::core::model::SimulationModel;
use crate::core::record::CollisionKind;
use crate::core::{parser, query, ParticleId};
use crate::error::Error;

fn py_err(e: Error) -> PyErr {
    match e {
        Error::UnknownParticle(_) => PyKeyError::new_err(e.to_string()),
        Error::FrameOutOfRange { .. } => PyIndexError::new_err(e.to_string()),
        Error::Io(io) => io.into(),
        Error::Format { .. } => PyValueError::new_err(e.to_string()),
    }
}

/// SimLog Python-facing wrapper around the parsed simulation log.
///
/// - __new__(path)
/// - box_size() -> (width, height)
/// - obstacles() -> np.ndarray, shape (K, 3): [x, y, side]
/// - particle_ids() -> list[int]
/// - times() -> np.ndarray, shape (F,)
/// - frame_state(time, tolerance=1e-3) -> np.ndarray, shape (M, 5)
/// - trajectory(id) -> np.ndarray, shape (M, 5)
/// - collisions_near(time, window=0.1) -> list[(time, kind, payload)]
/// - collision_tally() -> dict[kind, count]
/// - playback_frames(max_frames=500) -> list[int]
#[pyclass]
pub struct SimLog {
    model: SimulationModel,
}

#[pymethods]
impl SimLog {
    /// Parse the log file at `path` into memory (releases the GIL while
    /// reading).
    ///
    /// Errors: raises OSError if the file cannot be read, ValueError on a
    /// malformed line.
    #[new]
    fn new(py: Python<'_>, path: PathBuf) -> PyResult<Self> {
        let model = py.detach(|| parser::parse_path(&path)).map_err(py_err)?;
        Ok(Self { model })
    }

    /// Return the box dimensions as (width, height).
    fn box_size(&self) -> PyResult<(f64, f64)> {
        let dims = self.model.box_dimensions();
        Ok((dims.width, dims.height))
    }

    /// Return obstacles as a NumPy array of shape (K, 3): [x, y, side] per row.
    fn obstacles<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray2<f64>>> {
        let obstacles = self.model.obstacles();
        let mut arr = Array2::<f64>::zeros((obstacles.len(), 3));
        for (i, ob) in obstacles.iter().enumerate() {
            arr[[i, 0]] = ob.x;
            arr[[i, 1]] = ob.y;
            arr[[i, 2]] = ob.side;
        }
        Ok(arr.into_pyarray(py).into())
    }

    /// Return all particle ids in ascending order.
    fn particle_ids(&self) -> PyResult<Vec<ParticleId>> {
        Ok(self.model.particle_ids())
    }

    /// Return the number of distinct particles.
    fn num_particles(&self) -> PyResult<usize> {
        Ok(self.model.num_particles())
    }

    /// Return the number of frames on the timeline.
    fn frame_count(&self) -> PyResult<usize> {
        Ok(self.model.frame_count())
    }

    /// Return the full frame timeline as a NumPy array of shape (F,).
    fn times<'py>(&self, py: Python<'py>) -> PyResult<Py<PyArray1<f64>>> {
        Ok(self.model.times().to_vec().into_pyarray(py).into())
    }

    /// Return the timestamp of the frame at `index`.
    ///
    /// Errors: raises IndexError when `index` is past the last frame.
    fn time_at(&self, index: usize) -> PyResult<f64> {
        self.model.time_at(index).map_err(py_err)
    }

    /// Return the particles present at `time` as a NumPy array of shape
    /// (M, 5): [id, x, y, radius, mass] per row, ascending by id. Particles
    /// with no sample within `tolerance` of `time` are omitted.
    #[pyo3(signature = (time, tolerance=query::SAMPLE_TOLERANCE))]
    fn frame_state<'py>(
        &self,
        py: Python<'py>,
        time: f64,
        tolerance: f64,
    ) -> PyResult<Py<PyArray2<f64>>> {
        let snapshot = query::frame_snapshot(&self.model, time, tolerance);
        let mut arr = Array2::<f64>::zeros((snapshot.len(), 5));
        for (i, (id, s)) in snapshot.into_iter().enumerate() {
            arr[[i, 0]] = f64::from(id);
            arr[[i, 1]] = s.x;
            arr[[i, 2]] = s.y;
            arr[[i, 3]] = s.radius;
            arr[[i, 4]] = s.mass;
        }
        Ok(arr.into_pyarray(py).into())
    }

    /// Return one particle's full trajectory as a NumPy array of shape
    /// (M, 5): [time, x, y, radius, mass] per row, ascending by time.
    ///
    /// Errors: raises KeyError for an id the log never mentioned.
    fn trajectory<'py>(&self, py: Python<'py>, id: ParticleId) -> PyResult<Py<PyArray2<f64>>> {
        let trajectory = self.model.trajectory_of(id).map_err(py_err)?;
        let samples = trajectory.samples();
        let mut arr = Array2::<f64>::zeros((samples.len(), 5));
        for (i, s) in samples.iter().enumerate() {
            arr[[i, 0]] = s.time;
            arr[[i, 1]] = s.x;
            arr[[i, 2]] = s.y;
            arr[[i, 3]] = s.radius;
            arr[[i, 4]] = s.mass;
        }
        Ok(arr.into_pyarray(py).into())
    }

    /// Return collisions with |event time - time| < window, in log order,
    /// as (time, kind, payload) tuples.
    #[pyo3(signature = (time, window=query::COLLISION_WINDOW))]
    fn collisions_near(&self, time: f64, window: f64) -> PyResult<Vec<(f64, String, Vec<String>)>> {
        Ok(query::collisions_near(&self.model, time, window)
            .into_iter()
            .map(|ev| (ev.time, ev.kind.tag().to_string(), ev.payload.clone()))
            .collect())
    }

    /// Return collision counts per kind as a dict keyed by the log tag.
    fn collision_tally<'py>(&self, py: Python<'py>) -> PyResult<Py<PyDict>> {
        let tally = self.model.collision_tally();
        let out = PyDict::new(py);
        out.set_item(CollisionKind::Wall.tag(), tally.wall)?;
        out.set_item(CollisionKind::Obstacle.tag(), tally.obstacle)?;
        out.set_item(CollisionKind::Particle.tag(), tally.particle)?;
        Ok(out.into())
    }

    /// Return the frame indices a decimated playback pass should visit, at
    /// most roughly `max_frames` of them.
    #[pyo3(signature = (max_frames=500))]
    fn playback_frames(&self, max_frames: usize) -> PyResult<Vec<usize>> {
        Ok(query::playback_frames(&self.model, max_frames).collect())
    }
}

/// The simlog Python module entry point.
#[pymodule]
fn simlog(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<SimLog>()?;
    Ok(())
}
