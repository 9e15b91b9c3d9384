//! Definitions and implementations for the abstract clock aggregate
//!
//! The clock owns the system time, the servo, and the cross-port best master
//! clock decision. A [`Port`](crate::port::Port) only ever talks to it
//! through the [`Clock`] trait: it reports timing samples and asks for the
//! identities that gate message processing.

use core::cmp::Ordering;
use std::{cell::RefCell, rc::Rc};

use crate::{
    bmc::ComparisonDataset,
    datastructures::common::{ClockIdentity, PortIdentity, TimeInterval},
    time::Time,
    transport::FdArray,
};

/// The clock aggregate shared by all ports of a PTP instance
pub trait Clock {
    /// The identity of the local clock
    fn identity(&self) -> ClockIdentity;

    /// The identity of the master port this clock currently follows
    fn parent_identity(&self) -> PortIdentity;

    /// The PTP domain this clock participates in
    fn domain_number(&self) -> u8;

    /// Register the descriptors belonging to a port, so that the clock's
    /// multiplexer can poll them.
    ///
    /// A port calls this once per (re)initialization; a later call replaces
    /// the registration of an earlier one.
    fn install_fda(&mut self, port: PortIdentity, fda: &FdArray);

    /// Feed the servo with one Sync measurement.
    ///
    /// - `t1`: egress time of the Sync at the master (from the one-step Sync
    ///   body or the Follow_Up body)
    /// - `t2`: ingress time of the Sync at our port
    /// - `c1`: the correction field of the Sync
    /// - `c2`: the correction field of the Follow_Up (zero for one-step)
    /// - `asymmetry`: the configured path asymmetry; always zero for now
    fn synchronize(
        &mut self,
        t1: Time,
        t2: Time,
        c1: TimeInterval,
        c2: TimeInterval,
        asymmetry: TimeInterval,
    );

    /// Feed the servo with one delay measurement.
    ///
    /// - `t3`: egress time of our Delay_Req
    /// - `t4`: ingress time of the Delay_Req at the master (from the
    ///   Delay_Resp body)
    /// - `correction`: the correction field of the Delay_Resp
    fn path_delay(&mut self, t3: Time, t4: Time, correction: TimeInterval);

    /// The dataset comparison used to rank foreign master candidates.
    ///
    /// [`Ordering::Greater`] means `a` is the better candidate. The default
    /// is the standard comparison algorithm of *IEEE1588-2019 section 9.3.4*.
    fn dataset_comparison(&self, a: &ComparisonDataset, b: &ComparisonDataset) -> Ordering {
        a.compare(b)
    }
}

/// The scheduling model is single-threaded cooperative, so a clock shared
/// between the ports of an instance is simply a reference-counted cell.
impl<C: Clock> Clock for Rc<RefCell<C>> {
    fn identity(&self) -> ClockIdentity {
        self.borrow().identity()
    }

    fn parent_identity(&self) -> PortIdentity {
        self.borrow().parent_identity()
    }

    fn domain_number(&self) -> u8 {
        self.borrow().domain_number()
    }

    fn install_fda(&mut self, port: PortIdentity, fda: &FdArray) {
        self.borrow_mut().install_fda(port, fda)
    }

    fn synchronize(
        &mut self,
        t1: Time,
        t2: Time,
        c1: TimeInterval,
        c2: TimeInterval,
        asymmetry: TimeInterval,
    ) {
        self.borrow_mut().synchronize(t1, t2, c1, c2, asymmetry)
    }

    fn path_delay(&mut self, t3: Time, t4: Time, correction: TimeInterval) {
        self.borrow_mut().path_delay(t3, t4, correction)
    }

    fn dataset_comparison(&self, a: &ComparisonDataset, b: &ComparisonDataset) -> Ordering {
        self.borrow().dataset_comparison(a, b)
    }
}
