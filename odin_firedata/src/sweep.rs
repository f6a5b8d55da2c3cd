/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize,Serialize};
use tracing::error;

use crate::{compositor::FireDataCompositor, errors::*, export::SubmissionHandle};

/// the dates to export: every day of `[start, end]` that does not fall into one of `skip_months` (1-12)
#[derive(Debug,Clone,PartialEq,Eq,Serialize,Deserialize)]
pub struct DateSweep {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub skip_months: Vec<u32>,
}

impl DateSweep {
    pub fn new (start: NaiveDate, end: NaiveDate, skip_months: Vec<u32>)->Self {
        DateSweep { start, end, skip_months }
    }

    pub fn includes (&self, date: NaiveDate)->bool {
        date >= self.start && date <= self.end && !self.skip_months.contains( &date.month())
    }

    pub fn dates (&self)->DateSweepIter<'_> {
        DateSweepIter { sweep: self, next: Some(self.start) }
    }
}

pub struct DateSweepIter<'a> {
    sweep: &'a DateSweep,
    next: Option<NaiveDate>,
}

impl<'a> Iterator for DateSweepIter<'a> {
    type Item = NaiveDate;

    fn next (&mut self)->Option<NaiveDate> {
        while let Some(date) = self.next {
            if date > self.sweep.end {
                self.next = None;
                break
            }
            self.next = date.succ_opt();
            if !self.sweep.skip_months.contains( &date.month()) {
                return Some(date)
            }
        }
        None
    }
}

#[derive(Debug)]
pub struct DayOutcome {
    pub date: NaiveDate,
    pub result: Result<SubmissionHandle>,
}

#[derive(Debug,Default)]
pub struct SweepReport {
    pub outcomes: Vec<DayOutcome>,
}

impl SweepReport {
    pub fn succeeded (&self)->impl Iterator<Item=&DayOutcome> {
        self.outcomes.iter().filter( |o| o.result.is_ok())
    }

    pub fn failed (&self)->impl Iterator<Item=&DayOutcome> {
        self.outcomes.iter().filter( |o| o.result.is_err())
    }
}

/// export all dates of `sweep` one after the other. A failing date is logged and does not stop the sweep
pub async fn run_sweep (compositor: &FireDataCompositor, sweep: &DateSweep)->SweepReport {
    let mut report = SweepReport::default();

    for date in sweep.dates() {
        println!("Queueing {}", date.format("%Y-%m-%d"));

        let result = compositor.export_day( date).await;
        if let Err(e) = &result {
            error!("{date} did not export correctly: {}", error_chain(e));
        }
        report.outcomes.push( DayOutcome { date, result });
    }

    report
}
